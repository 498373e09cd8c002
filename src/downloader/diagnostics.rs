// Classifies yt-dlp failures so the logs say why a strategy lost.
// The orchestrator never branches on this; every failure falls through to
// the next strategy regardless of reason.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingReason {
    BotDetection,
    PoTokenRequired,
    SabrStreaming,
    AgeRestricted,
    PrivateVideo,
    VideoUnavailable,
    GeoBlocked,
    RateLimited,
    Http403Forbidden,
    CookiesUnreadable,
    NetworkTimeout,
    Unknown,
}

impl BlockingReason {
    pub fn description(&self) -> &'static str {
        match self {
            Self::BotDetection => "bot detection triggered",
            Self::PoTokenRequired => "PO token required",
            Self::SabrStreaming => "SABR streaming protection",
            Self::AgeRestricted => "age-restricted",
            Self::PrivateVideo => "private video",
            Self::VideoUnavailable => "video unavailable",
            Self::GeoBlocked => "geo-blocked",
            Self::RateLimited => "rate limited",
            Self::Http403Forbidden => "HTTP 403",
            Self::CookiesUnreadable => "cookies could not be loaded",
            Self::NetworkTimeout => "network timeout",
            Self::Unknown => "unclassified",
        }
    }

    /// Whether a cookie-backed strategy has a better chance than the others
    pub fn cookies_might_help(&self) -> bool {
        matches!(
            self,
            Self::BotDetection
                | Self::PoTokenRequired
                | Self::AgeRestricted
                | Self::PrivateVideo
                | Self::Http403Forbidden
        )
    }
}

impl fmt::Display for BlockingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

// Checked top to bottom, most specific first.
const PATTERNS: &[(BlockingReason, &[&str])] = &[
    (BlockingReason::CookiesUnreadable, &["could not find chrome cookies", "could not find firefox cookies", "failed to decrypt", "cookies database"]),
    (BlockingReason::SabrStreaming, &["sabr"]),
    (BlockingReason::PoTokenRequired, &["po token", "proof of origin"]),
    (BlockingReason::AgeRestricted, &["sign in to confirm your age", "age-restricted"]),
    (BlockingReason::BotDetection, &["not a bot", "captcha", "unusual traffic"]),
    (BlockingReason::PrivateVideo, &["private video", "video is private"]),
    (BlockingReason::VideoUnavailable, &["video unavailable", "no longer available", "has been removed"]),
    (BlockingReason::GeoBlocked, &["not available in your country", "blocked in your country"]),
    (BlockingReason::RateLimited, &["429", "too many requests", "rate limit"]),
    (BlockingReason::Http403Forbidden, &["403", "forbidden"]),
    (BlockingReason::NetworkTimeout, &["timed out", "timeout", "connection refused", "network is unreachable"]),
];

/// Best guess at why a strategy failed; `None` for an empty message
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    if error.trim().is_empty() {
        return None;
    }

    let lower = error.to_lowercase();
    let reason = PATTERNS
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(reason, _)| *reason)
        .unwrap_or(BlockingReason::Unknown);

    Some(reason)
}
