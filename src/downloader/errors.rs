// Error types for a single extraction attempt

use thiserror::Error;

/// Failure of one strategy. The orchestrator treats every variant the same
/// way: record the message and move on to the next strategy.
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// yt-dlp binary could not be started
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// yt-dlp ran and exited with a non-zero status; holds its stderr
    #[error("{0}")]
    ExtractorFailed(String),

    /// The subprocess exceeded the configured timeout and was killed
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Probe succeeded but the selected format carried no direct URL
    #[error("No stream URL in extractor response")]
    NoStreamUrl,

    /// Download finished but yt-dlp did not report where the file went
    #[error("Extractor did not report an output file")]
    NoOutputFile,

    /// Spawning or waiting on the subprocess failed
    #[error("Execution error: {0}")]
    ExecutionError(String),
}

impl DownloadError {
    /// Build an `ExtractorFailed` from raw stderr, keeping only the lines
    /// yt-dlp marks as errors when there are any.
    pub fn from_stderr(stderr: &str) -> Self {
        let errors: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("ERROR:"))
            .collect();

        let message = if errors.is_empty() {
            stderr.trim().to_string()
        } else {
            errors.join("\n")
        };

        if message.is_empty() {
            Self::ExtractorFailed("yt-dlp exited with an error and no output".to_string())
        } else {
            Self::ExtractorFailed(message)
        }
    }
}
