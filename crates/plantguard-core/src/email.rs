//! Disposable email domain checks
//!
//! Used by the signup flow to turn away throwaway inboxes. Matching is exact
//! on the lower-cased domain; subdomains of a listed domain are not caught.

use crate::error::{Error, Result};
use std::collections::HashSet;
use tracing::info;

/// Known disposable-email domains
pub const DISPOSABLE_DOMAINS: &[&str] = &[
    "10minutemail.com",
    "guerrillamail.com",
    "mailinator.com",
    "tempmail.org",
    "yopmail.com",
    "temp-mail.org",
    "throwaway.email",
    "maildrop.cc",
    "mohmal.com",
    "sharklasers.com",
    "getnada.com",
    "tempail.com",
    "dispostable.com",
    "mailtemp.info",
    "10minutemail.net",
    "throwawaymail.com",
    "fakemailgenerator.com",
    "mailcatch.com",
    "trashmail.org",
    "tempinbox.com",
    "meltmail.com",
];

/// Domain part of `email`: the lower-cased text after the last `@`.
///
/// Returns `None` when there is no `@` at all.
#[must_use]
pub fn email_domain(email: &str) -> Option<String> {
    let lower = email.to_lowercase();
    lower.rfind('@').map(|idx| lower[idx + 1..].to_string())
}

/// Whether `email` belongs to a built-in disposable domain.
///
/// An address without `@` has no domain and is therefore never temporary.
#[must_use]
pub fn check_domain(email: &str) -> bool {
    email_domain(email)
        .map(|domain| DISPOSABLE_DOMAINS.contains(&domain.as_str()))
        .unwrap_or(false)
}

/// Reject absent or empty email input.
pub fn validate_email(email: Option<&str>) -> Result<&str> {
    match email {
        Some(e) if !e.is_empty() => Ok(e),
        _ => Err(Error::BadRequest("Email is required".to_string())),
    }
}

/// Disposable-domain checker with operator-supplied extra domains
#[derive(Debug, Clone)]
pub struct EmailDomainChecker {
    domains: HashSet<String>,
}

impl Default for EmailDomainChecker {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl EmailDomainChecker {
    /// Create a checker with the built-in list plus `extra` domains
    #[must_use]
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = DISPOSABLE_DOMAINS
            .iter()
            .map(|d| (*d).to_string())
            .chain(
                extra
                    .into_iter()
                    .map(|d| d.as_ref().trim().to_lowercase())
                    .filter(|d| !d.is_empty()),
            )
            .collect();
        Self { domains }
    }

    /// Number of blocked domains
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Whether the block list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Whether `email` uses a blocked domain
    #[must_use]
    pub fn is_temporary(&self, email: &str) -> bool {
        let domain = email_domain(email);
        let temporary = domain
            .as_deref()
            .map(|d| self.domains.contains(d))
            .unwrap_or(false);

        info!(
            domain = domain.as_deref().unwrap_or("<none>"),
            is_temporary = temporary,
            "Email validation check"
        );
        temporary
    }
}
