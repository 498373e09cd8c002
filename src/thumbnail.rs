// Thumbnail normalizer - pick the largest variant and ask for a bigger rendition

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Size suffix YouTube Music's image CDN understands
pub const HIGH_RES_SUFFIX: &str = "=w600-h600";

lazy_static::lazy_static! {
    static ref SIZE_PARAM_RE: Regex = Regex::new(r"=w\d+-h\d+").unwrap();
}

/// One image variant as returned by the search API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl Thumbnail {
    fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Largest variant by `width * height`; the first one wins a tie
pub fn select_largest(thumbnails: &[Thumbnail]) -> Option<&Thumbnail> {
    thumbnails.iter().fold(None, |best: Option<&Thumbnail>, t| match best {
        Some(b) if b.area() >= t.area() => Some(b),
        _ => Some(t),
    })
}

/// Rewrite the first `=w<N>-h<N>` to the high-res size. When the last path
/// segment carries no `=` parameter at all, append one.
pub fn upscale_url(url: &str) -> String {
    let mut out = SIZE_PARAM_RE.replace(url, HIGH_RES_SUFFIX).into_owned();
    let last_segment = out.rsplit('/').next().unwrap_or("");
    if !last_segment.contains('=') {
        out.push_str(HIGH_RES_SUFFIX);
    }
    out
}

/// URL to show for a search result; empty when there are no thumbnails
pub fn best_thumbnail_url(thumbnails: &[Thumbnail]) -> String {
    select_largest(thumbnails)
        .map(|t| upscale_url(&t.url))
        .unwrap_or_default()
}
