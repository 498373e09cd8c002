// Extractor trait definition

use std::path::PathBuf;

use async_trait::async_trait;

use super::errors::DownloadError;
use super::strategy::ExtractionStrategy;

/// Something that can resolve or fetch a media item under a given strategy
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Resolve a direct stream URL without writing anything to disk
    async fn probe(&self, url: &str, strategy: &ExtractionStrategy) -> Result<String, DownloadError>;

    /// Download into the strategy's output template and return the final path
    async fn download(
        &self,
        url: &str,
        strategy: &ExtractionStrategy,
    ) -> Result<PathBuf, DownloadError>;
}
