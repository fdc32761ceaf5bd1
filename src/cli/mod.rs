//! CLI module for PlantGuard
//!
//! Provides commands:
//! - `serve`: Start the HTTP server (default)
//! - `analyze`: Diagnose a single leaf photo and print a report
//! - `check-email`: Check an address against the disposable-domain list

use crate::server::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod analyze;
pub mod check_email;

/// PlantGuard plant disease diagnosis
#[derive(Parser, Debug)]
#[command(name = "plantguard")]
#[command(about = "Plant disease diagnosis from leaf photos")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Analyze a leaf image and print the diagnosis
    Analyze {
        /// Path to the image file
        image: PathBuf,
        /// Analysis endpoint URL; analyzes in-process when omitted
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Check whether an email uses a disposable domain
    CheckEmail {
        /// Email address
        email: String,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Analyze { image, endpoint }) => {
            analyze::run(&image, endpoint, &config).await
        }
        Some(Commands::CheckEmail { email }) => check_email::run(&email, &config),
        Some(Commands::Serve) | None => crate::server::run(config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from(["plantguard", "analyze", "leaf.jpg", "--endpoint", "http://x"]);
        match cli.command {
            Some(Commands::Analyze { image, endpoint }) => {
                assert_eq!(image, PathBuf::from("leaf.jpg"));
                assert_eq!(endpoint.as_deref(), Some("http://x"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::parse_from(["plantguard"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_check_email() {
        let cli = Cli::parse_from(["plantguard", "check-email", "a@b.com"]);
        assert!(matches!(cli.command, Some(Commands::CheckEmail { ref email }) if email == "a@b.com"));
    }
}
