//! Server module for PlantGuard
//!
//! Contains server initialization and runtime logic.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures
//! - `loader`: Configuration loading from files and environment
//! - `validation`: Production configuration validation
//! - `init`: Vision model setup, router assembly and the run loop

pub mod config;
mod init;
mod loader;
mod validation;

pub use config::AppConfig;
pub use init::{build_service, run};
pub use loader::load_config;
