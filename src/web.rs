//! HTTP surface of the skill
//!
//! A single anonymous `POST` endpoint. Every request is verified before it is
//! routed; verification failures and undecodable bodies answer 400 with no
//! body.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::{ServerConfig, SkillConfig};
use crate::error::MeteosatError;
use crate::models::{SkillRequest, SkillResponse};
use crate::verifier::{AlexaRequestVerifier, RequestVerifier, SignatureHeaders};
use crate::{response_builder, router};

pub const SKILL_ENDPOINT: &str = "/api/meteosat";

/// Shared state for the skill endpoint.
#[derive(Clone)]
pub struct AppState {
    verifier: Arc<dyn RequestVerifier>,
}

impl AppState {
    pub fn new(verifier: Arc<dyn RequestVerifier>) -> Self {
        Self { verifier }
    }
}

pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route(SKILL_ENDPOINT, post(handle_skill_request))
        .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_seconds.into()),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[instrument(skip_all, fields(request_type = tracing::field::Empty, intent = tracing::field::Empty))]
async fn handle_skill_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SkillResponse>, MeteosatError> {
    let signature_headers = SignatureHeaders::from_headers(&headers);

    let request: SkillRequest = serde_json::from_slice(&body)
        .map_err(|e| MeteosatError::malformed(format!("Unparseable skill request: {e}")))?;

    let span = tracing::Span::current();
    span.record("request_type", request.request.request_type.as_str());
    if let Some(intent) = request.intent_name() {
        span.record("intent", intent);
    }

    if !state
        .verifier
        .validate(&body, &signature_headers, request.timestamp())
        .await
    {
        return Err(MeteosatError::signature("Request failed verification"));
    }

    let action = router::route(&request);
    info!(?action, "Answering skill request");
    Ok(Json(response_builder::build(action)))
}

/// Serve the skill until interrupted.
pub async fn run(config: SkillConfig) -> Result<()> {
    let verifier = AlexaRequestVerifier::new(&config.verification)
        .context("Failed to create request verifier")?;
    let app = create_router(AppState::new(Arc::new(verifier)), &config.server);
    let addr = config.server.socket_addr()?;

    match config.server.tls_paths() {
        Some((cert, key)) => serve_tls(addr, app, cert, key).await,
        None => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            info!("Skill listening at http://{}{}", addr, SKILL_ENDPOINT);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("HTTP server failed")
        }
    }
}

#[cfg(feature = "tls")]
async fn serve_tls(
    addr: std::net::SocketAddr,
    app: Router,
    cert: &std::path::Path,
    key: &std::path::Path,
) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("Failed to load TLS material from {}", cert.display()))?;

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    info!("Skill listening at https://{}{}", addr, SKILL_ENDPOINT);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("HTTPS server failed")
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(
    _addr: std::net::SocketAddr,
    _app: Router,
    _cert: &std::path::Path,
    _key: &std::path::Path,
) -> Result<()> {
    anyhow::bail!("TLS paths are configured but this build lacks the `tls` feature")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
