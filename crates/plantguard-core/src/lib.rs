//! PlantGuard Core - Diagnosis Pipeline
//!
//! This crate provides the domain logic of the PlantGuard plant-disease
//! diagnosis service:
//! - Diagnosis: the diagnosis/treatment model and the raw model-output schema
//! - Email: disposable email domain checks
//! - Image: base64 data URL encoding of uploaded images
//! - Client: the analysis client that calls the analysis endpoint
//! - Service: the analysis proxy pipeline in front of the vision model
//! - Presentation: severity/treatment styling, instructions, text reports
//! - Session: the upload → analyze → result state machine
//! - Shutdown: signal handling for graceful shutdown

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod diagnosis;
pub mod email;
pub mod error;
pub mod image;
pub mod presentation;
pub mod prompt;
pub mod service;
pub mod session;
pub mod shutdown;

pub use client::{AnalysisClient, AnalysisRequest, AnalysisTransport, HttpTransport, TransportError};
pub use diagnosis::{AnalysisOutcome, Diagnosis, SchemaError, Severity, Treatment, TreatmentType};
pub use email::{check_domain, validate_email, EmailDomainChecker, DISPOSABLE_DOMAINS};
pub use error::{Error, Result, UserFriendlyError};
pub use image::{EncodedImage, ImageEncoder};
pub use presentation::{
    instructions_for, render_report, InstructionRecord, InstructionSource, Instructions,
    SeverityStyle, TreatmentKey, TreatmentStyle,
};
pub use service::{AnalysisService, AnalysisStage};
pub use session::{AnalysisSession, SessionState};
pub use shutdown::{shutdown_signal, wait_for_shutdown_signal};
