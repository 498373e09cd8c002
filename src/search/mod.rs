// Search collaborator - music catalog lookups

mod ytmusic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::thumbnail::{best_thumbnail_url, Thumbnail};

pub use ytmusic::YtMusicClient;

/// Number of songs returned per search
pub const SEARCH_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status} for URL: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to parse search response: {0}")]
    Parse(String),
}

/// Raw search hit, fields exactly as far as the catalog provided them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchItem {
    pub title: Option<String>,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub duration: Option<String>,
    pub thumbnails: Vec<Thumbnail>,
    pub video_id: Option<String>,
}

/// Track as the web UI consumes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: String,
    pub thumbnail: String,
    pub video_id: String,
}

impl From<SearchItem> for Track {
    fn from(item: SearchItem) -> Self {
        let artist = if item.artists.is_empty() {
            "Unknown Artist".to_string()
        } else {
            item.artists.join(", ")
        };

        Self {
            title: item.title.unwrap_or_else(|| "Unknown".to_string()),
            artist,
            album: item.album.unwrap_or_else(|| "Unknown Album".to_string()),
            duration: item.duration.unwrap_or_else(|| "N/A".to_string()),
            thumbnail: best_thumbnail_url(&item.thumbnails),
            video_id: item.video_id.unwrap_or_default(),
        }
    }
}

/// Free-text song search against a music catalog
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search_songs(&self, query: &str, limit: usize) -> Result<Vec<SearchItem>, SearchError>;
}
