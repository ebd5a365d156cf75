pub mod analysis;
pub mod config;
pub mod detect;
pub mod error;
pub mod provider;
pub mod types;
pub mod ui;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use config::Config;
use detect::InferenceClient;
use provider::{ChatConnector, CredentialSource, HttpConnector, ProcessEnv};

/// Shared by every handler. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub inference: InferenceClient,
    pub credentials: Arc<dyn CredentialSource>,
    pub chat: Arc<dyn ChatConnector>,
}

impl AppState {
    pub fn new(
        inference: InferenceClient,
        credentials: Arc<dyn CredentialSource>,
        chat: Arc<dyn ChatConnector>,
    ) -> Self {
        Self {
            inference,
            credentials,
            chat,
        }
    }

    /// Real inference server and providers, keys read from the environment.
    pub fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::new();
        Self::new(
            InferenceClient::new(http.clone(), config.inference_base_url.clone()),
            Arc::new(ProcessEnv),
            Arc::new(HttpConnector::new(
                http,
                config.openai_base_url.clone(),
                config.gemini_base_url.clone(),
            )),
        )
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(ui::index))
        .route("/detect", get(ui::index))
        .route(
            "/api/detect-acne",
            get(detect::health).post(detect::detect_acne),
        )
        .route("/api/detect-acne/info", get(detect::model_info))
        .route(
            "/api/analyze-acne",
            get(analysis::describe).post(analysis::analyze_acne),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}
