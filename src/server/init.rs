//! Server initialization
//!
//! Contains the main `run()` function that builds the analysis service and
//! serves the HTTP API until a shutdown signal arrives.

use super::config::AppConfig;
use super::validation::validate_production_config;
use crate::api::AppState;
use anyhow::{Context, Result};
use plantguard_core::{shutdown_signal, AnalysisService, EmailDomainChecker};
use plantguard_llm::{GeminiConfig, GeminiProvider, VisionModel};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Resolve the vision model from the environment and wrap it in the
/// analysis pipeline.
///
/// A missing API key is not fatal: the service starts unconfigured and each
/// analysis request reports it.
pub fn build_service(config: &AppConfig) -> AnalysisService {
    let model: Option<Arc<dyn VisionModel>> = match GeminiConfig::from_env() {
        Ok(mut gemini) => {
            // GEMINI_MODEL / GEMINI_BASE_URL win over the config file
            if std::env::var("GEMINI_MODEL").is_err() {
                gemini = gemini.with_model(&config.gemini.model);
            }
            if let (Err(_), Some(url)) = (
                std::env::var("GEMINI_BASE_URL"),
                config.gemini.base_url.as_ref(),
            ) {
                gemini = gemini.with_base_url(url);
            }
            gemini = gemini.with_timeout(config.gemini.timeout());

            match GeminiProvider::new(gemini) {
                Ok(provider) => {
                    info!(model = %provider.model(), "Gemini provider initialized");
                    Some(Arc::new(provider))
                }
                Err(e) => {
                    warn!(error = %e, "Failed to create Gemini provider");
                    None
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "Gemini API key not configured; analysis requests will fail");
            None
        }
    };

    AnalysisService::new(model)
        .with_settings(config.gemini.generation_settings())
        .with_timeout(config.analysis.timeout())
}

/// Run the server
pub async fn run(config: AppConfig) -> Result<()> {
    info!(
        "Starting PlantGuard v{} ({})",
        env!("CARGO_PKG_VERSION"),
        super::loader::environment_name()
    );

    let service = build_service(&config);
    validate_production_config(&config, service.is_configured());
    info!(
        model = service.model_name().unwrap_or("<none>"),
        timeout_secs = config.analysis.timeout_secs,
        "Analysis service ready"
    );

    let email = EmailDomainChecker::new(&config.email.extra_blocked_domains);
    info!(blocked_domains = email.len(), "Email domain checker initialized");

    let shutdown = CancellationToken::new();
    let state = AppState::new(service, email, shutdown.clone());
    let app = crate::api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("HTTP server error")?;

    info!("PlantGuard shutdown complete");
    Ok(())
}
