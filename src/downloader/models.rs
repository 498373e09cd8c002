// Common data models for the extraction pipeline

use std::fmt;
use std::path::PathBuf;

/// Audio container the caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatClass {
    #[default]
    M4a,
    Webm,
    /// Whatever yt-dlp considers the best audio-only stream
    BestAudio,
}

impl FormatClass {
    /// Map the `format` field of a download request. Anything that is not
    /// `m4a` falls through to webm.
    pub fn from_request(format: Option<&str>) -> Self {
        match format {
            None | Some("m4a") => Self::M4a,
            Some(_) => Self::Webm,
        }
    }

    /// yt-dlp `-f` selector
    pub fn selector(&self) -> &'static str {
        match self {
            Self::M4a => "bestaudio[ext=m4a]/bestaudio",
            Self::Webm => "bestaudio[ext=webm]/bestaudio",
            Self::BestAudio => "bestaudio",
        }
    }
}

/// What the orchestrator asks the extractor for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Write the media file to the strategy's output template
    Download,
    /// Resolve a direct stream URL without touching disk
    Probe,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download => write!(f, "download"),
            Self::Probe => write!(f, "probe"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutput {
    StreamUrl(String),
    File(PathBuf),
}

/// A strategy produced a usable result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSuccess {
    /// 1-based position of the winning strategy in the plan
    pub strategy_number: usize,
    pub strategy_name: &'static str,
    pub output: ExtractionOutput,
}

impl ExtractionSuccess {
    /// Label reported to HTTP clients, e.g. `Strategy 3`
    pub fn method_label(&self) -> String {
        format!("Strategy {}", self.strategy_number)
    }
}

/// Every strategy in the plan failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionExhausted {
    pub mode: ExtractionMode,
    /// Message of the last strategy that was attempted
    pub last_error: Option<String>,
    pub attempts: usize,
    /// Whether the cookie file existed when the plan was built
    pub cookie_file_present: bool,
}

impl ExtractionExhausted {
    pub fn last_error_message(&self) -> &str {
        self.last_error.as_deref().unwrap_or("no strategies were attempted")
    }
}

impl fmt::Display for ExtractionExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ExtractionMode::Download => {
                write!(f, "All download methods failed. Last error: {}", self.last_error_message())?;
                if !self.cookie_file_present {
                    write!(f, " Consider adding a cookies.txt file for authentication.")?;
                }
            }
            ExtractionMode::Probe => {
                write!(f, "All extraction methods failed. Last error: {}", self.last_error_message())?;
                if !self.cookie_file_present {
                    write!(f, " Try adding a cookies.txt file for authentication.")?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ExtractionExhausted {}
