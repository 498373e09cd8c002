pub mod config;
pub mod downloader;
pub mod search;
pub mod server;
pub mod thumbnail;

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::{AppConfig, ConfigError};
use downloader::tools::{find_ytdlp, ytdlp_info};
use downloader::YtDlp;
use search::{SearchError, YtMusicClient};

pub use server::{router, AppContext};

const DEFAULT_LOG_FILTER: &str = "ytmusic_downloader_lib=info,ytmusic_downloader=info";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build search client: {0}")]
    Search(#[from] SearchError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Install the global subscriber. `RUST_LOG` wins over the default filter.
/// Returns false when a subscriber was already installed; that one is kept.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    match tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        Ok(()) => true,
        Err(e) => {
            debug!("tracing subscriber already installed, keeping it: {}", e);
            false
        }
    }
}

pub async fn run() -> Result<(), StartupError> {
    init_tracing();

    let config = AppConfig::from_env()?;
    tokio::fs::create_dir_all(&config.downloads_dir).await?;

    if config.cookies_file.exists() {
        info!("✓ {} found", config.cookies_file.display());
    } else {
        warn!(
            "{} not found. Some videos may require authentication.",
            config.cookies_file.display()
        );
    }

    let ytdlp_path = find_ytdlp(config.ytdlp_path.as_deref());
    let tool = ytdlp_info(&ytdlp_path).await;
    if tool.is_available {
        info!(
            "yt-dlp {} at {}",
            tool.version.as_deref().unwrap_or("unknown"),
            tool.path
        );
    } else {
        warn!("yt-dlp not runnable at {}; downloads and previews will fail", tool.path);
    }

    let extractor = Arc::new(
        YtDlp::new(ytdlp_path, config.ytdlp_timeout_secs).with_proxy(config.proxy.clone()),
    );
    let search = Arc::new(YtMusicClient::new(config.proxy.as_deref())?);

    let addr = SocketAddr::new(config.host, config.port);
    let ctx = AppContext::new(config, search, extractor);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", addr);

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
