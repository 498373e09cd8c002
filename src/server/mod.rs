// HTTP façade

mod error;
mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::config::AppConfig;
use crate::downloader::{Downloader, Extractor, StrategyBuilder};
use crate::search::SearchClient;

pub use error::{ApiError, ApiResult};
pub use handlers::{DownloadRequest, PreviewRequest, SearchRequest};

/// Everything a request handler needs. Built once at startup and only read
/// afterwards.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub search: Arc<dyn SearchClient>,
    pub downloader: Downloader,
    pub strategies: StrategyBuilder,
}

impl AppContext {
    pub fn new(config: AppConfig, search: Arc<dyn SearchClient>, extractor: Arc<dyn Extractor>) -> Self {
        let strategies = StrategyBuilder::new(config.cookies_file.clone(), config.browser_cookies);
        Self {
            config: Arc::new(config),
            search,
            downloader: Downloader::new(extractor),
            strategies,
        }
    }
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/search", post(handlers::search))
        .route("/download", post(handlers::download))
        .route("/preview", post(handlers::preview))
        .route("/downloads/:filename", get(handlers::serve_download))
        .with_state(ctx)
}
