//! HTTP service: upload a template, then fill it with JSON values.
//!
//! | Route          | Handler                       |
//! |----------------|-------------------------------|
//! | `GET /`        | upload form                   |
//! | `POST /upload` | store the template            |
//! | `POST /process`| fill and return it as base64  |

mod config;
mod error;
mod handlers;

pub use config::{
    ServiceConfig, DEFAULT_BIND, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_OUTPUT_PREFIX,
    DEFAULT_STORAGE_DIR,
};
pub use error::ApiError;
pub use handlers::{ProcessResponse, UploadResponse};

use crate::error::Result;
use crate::store::TemplateStore;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<TemplateStore>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    /// Open the template store described by `config`.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let store = TemplateStore::open(&config.storage_dir, config.template_name.clone())?;
        Ok(Self {
            store: Arc::new(store),
            config: Arc::new(config),
        })
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/process", post(handlers::process))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let bind = config.bind;
    let state = AppState::new(config)?;
    let listener = tokio::net::TcpListener::bind(bind).await?;

    tracing::info!(
        addr = %listener.local_addr()?,
        storage = %state.store.path().display(),
        "deckfill listening"
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}
