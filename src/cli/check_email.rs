//! `plantguard check-email`

use crate::server::AppConfig;
use anyhow::Result;
use plantguard_core::{validate_email, EmailDomainChecker};

pub fn run(email: &str, config: &AppConfig) -> Result<()> {
    let email = validate_email(Some(email))?;
    let checker = EmailDomainChecker::new(&config.email.extra_blocked_domains);

    if checker.is_temporary(email) {
        println!("⚠️  {} uses a disposable email domain", email);
    } else {
        println!("✅ {} is not on the disposable domain list", email);
    }
    Ok(())
}
