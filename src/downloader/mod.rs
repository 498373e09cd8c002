// Downloader module - strategy fallback around yt-dlp

pub mod diagnostics;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod strategy;
pub mod tools;
pub mod traits;
pub mod utils;
pub mod ytdlp;

pub use errors::DownloadError;
pub use models::{ExtractionExhausted, ExtractionMode, ExtractionOutput, ExtractionSuccess, FormatClass};
pub use orchestrator::Downloader;
pub use strategy::{
    BrowserProbe, ClientIdentity, CookieSource, ExtractionStrategy, StrategyBuilder, StrategyPlan,
};
pub use traits::Extractor;
pub use ytdlp::YtDlp;
