use std::path::Path;

use super::utils::run_output_with_timeout;

const YTDLP_BINARY: &str = "yt-dlp";

/// Where yt-dlp lives and which version it reports
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub path: String,
    pub version: Option<String>,
    pub is_available: bool,
}

/// Resolve the yt-dlp binary: explicit override, then common install
/// locations, then whatever `PATH` lookup gives us.
pub fn find_ytdlp(override_path: Option<&str>) -> String {
    if let Some(path) = override_path.filter(|p| !p.trim().is_empty()) {
        return path.to_string();
    }

    let common_paths = [
        "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
        "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac, pip --user installs
        "/usr/bin/yt-dlp",          // System installation
    ];

    for path in common_paths {
        if Path::new(path).exists() {
            return path.to_string();
        }
    }

    YTDLP_BINARY.to_string()
}

/// Ask the binary for its version; `is_available` is false when it can't run
pub async fn ytdlp_info(path: &str) -> ToolInfo {
    let version = match run_output_with_timeout(path, vec!["--version".to_string()], 15).await {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        }
        _ => None,
    };

    ToolInfo {
        path: path.to_string(),
        is_available: version.is_some(),
        version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        assert_eq!(find_ytdlp(Some("/opt/tools/yt-dlp")), "/opt/tools/yt-dlp");
    }

    #[test]
    fn blank_override_is_ignored() {
        let found = find_ytdlp(Some("  "));
        assert!(found.ends_with("yt-dlp"));
    }

    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let info = ytdlp_info("definitely-not-a-real-binary-xyz").await;
        assert!(!info.is_available);
        assert!(info.version.is_none());
    }
}
