//! Application startup and lifecycle management.

use crate::config::MedassistConfig;
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiProvider};
use crate::services::providers::openai::{OpenAiConfig, OpenAiPrescriptionProvider};
use crate::services::providers::{GenerativeProvider, PrescriptionProvider};
use crate::services::UploadStore;
use axum::{
    extract::DefaultBodyLimit,
    http::{Method, Request},
    middleware::from_fn,
    routing::{get, options, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: MedassistConfig,
    pub generative: Arc<dyn GenerativeProvider>,
    pub prescription: Arc<dyn PrescriptionProvider>,
    pub uploads: UploadStore,
    /// Cancelled on shutdown; aborts in-flight provider calls.
    pub shutdown: CancellationToken,
}

/// The two provider integrations, injectable for tests.
pub struct Providers {
    pub generative: Arc<dyn GenerativeProvider>,
    pub prescription: Arc<dyn PrescriptionProvider>,
}

impl Providers {
    /// Real Gemini and OpenAI clients built from configuration.
    pub fn from_config(config: &MedassistConfig) -> Result<Self, AppError> {
        let gemini = GeminiProvider::new(GeminiConfig {
            api_key: config.google.api_key.clone(),
            api_base: config.google.api_base.clone(),
            model: config.google.text_model.clone(),
            timeout: config.provider_timeout,
        })
        .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

        let openai = OpenAiPrescriptionProvider::new(OpenAiConfig {
            api_key: config.openai.api_key.clone(),
            api_base: config.openai.api_base.clone(),
            model: config.openai.vision_model.clone(),
            timeout: config.provider_timeout,
        })
        .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

        tracing::info!(
            text_model = %config.google.text_model,
            vision_model = %config.openai.vision_model,
            timeout_secs = config.provider_timeout.as_secs(),
            "Initialized AI providers"
        );

        Ok(Self {
            generative: Arc::new(gemini),
            prescription: Arc::new(openai),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.uploads.max_bytes;

    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/analyze", post(handlers::analyze_image))
        .route("/diagnose", get(handlers::diagnose))
        .route("/prescriptionanalyze", post(handlers::analyze_prescription))
        .fallback(handlers::not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        );

    // `OPTIONS /diagnose` stays outside the CORS layer, which would otherwise
    // answer every OPTIONS request itself; the handler sets its own CORS
    // headers. It is registered first so the merge keeps the layered
    // 405 fallback from `api` for the path's other methods.
    Router::new()
        .route("/diagnose", options(handlers::diagnose_preflight))
        .merge(api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri().path(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Build the application with the real providers.
    pub async fn build(config: MedassistConfig) -> Result<Self, AppError> {
        let providers = Providers::from_config(&config)?;
        Self::build_with_providers(config, providers).await
    }

    pub async fn build_with_providers(
        config: MedassistConfig,
        providers: Providers,
    ) -> Result<Self, AppError> {
        let uploads = UploadStore::new(&config.uploads.dir).await.map_err(|e| {
            tracing::error!(
                "Failed to initialize upload directory {}: {}",
                config.uploads.dir.display(),
                e
            );
            e
        })?;

        let state = AppState {
            config: config.clone(),
            generative: providers.generative,
            prescription: providers.prescription,
            uploads,
            shutdown: CancellationToken::new(),
        };

        // Bind HTTP listener (port 0 = random port for testing)
        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            upload_dir = %config.uploads.dir.display(),
            "Medassist service listening"
        );

        Ok(Self {
            port,
            listener,
            router: router(state.clone()),
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Cancelling this token stops the server and aborts in-flight provider
    /// calls.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.state.shutdown.clone()
    }

    /// Run the application until the shutdown token is cancelled.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let shutdown = self.state.shutdown.clone();

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}
