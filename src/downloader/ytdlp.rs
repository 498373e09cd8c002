// yt-dlp extractor - turns a strategy into a yt-dlp command line
//
// Probe:    yt-dlp -f <format> --dump-json ...      -> JSON with a direct `url`
// Download: yt-dlp -f <format> -o <template> --no-simulate --print after_move:filepath
//           -> final path on stdout once post-processing has moved the file

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::errors::DownloadError;
use super::models::ExtractionMode;
use super::strategy::{CookieSource, ExtractionStrategy};
use super::traits::Extractor;
use super::utils::run_output_with_timeout;

pub struct YtDlp {
    ytdlp_path: String,
    timeout_secs: u64,
    proxy: Option<String>,
}

impl YtDlp {
    pub fn new(ytdlp_path: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            timeout_secs,
            proxy: None,
        }
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Build command arguments
    pub fn build_args(&self, url: &str, strategy: &ExtractionStrategy, mode: ExtractionMode) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            strategy.format.to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];

        match mode {
            ExtractionMode::Probe => {
                args.push("--dump-json".to_string());
            }
            ExtractionMode::Download => {
                args.push("--quiet".to_string());
                args.push("--no-progress".to_string());
                args.push("--no-simulate".to_string());
                args.push("--print".to_string());
                args.push("after_move:filepath".to_string());
                if let Some(template) = &strategy.output_template {
                    args.push("-o".to_string());
                    args.push(template.clone());
                }
            }
        }

        if let Some(client) = &strategy.client {
            let mut extractor_args = format!("youtube:player_client={}", client.player_client);
            if !client.skip.is_empty() {
                extractor_args.push_str(&format!(";skip={}", client.skip.join(",")));
            }
            args.push("--extractor-args".to_string());
            args.push(extractor_args);

            for (name, value) in &client.headers {
                args.push("--add-header".to_string());
                args.push(format!("{}:{}", name, value));
            }
        }

        match &strategy.cookies {
            Some(CookieSource::File(path)) => {
                args.push("--cookies".to_string());
                args.push(path.to_string_lossy().to_string());
            }
            Some(CookieSource::Browser(browser)) => {
                args.push("--cookies-from-browser".to_string());
                args.push(browser.to_string());
            }
            None => {}
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push(url.to_string());
        args
    }

    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>, DownloadError> {
        debug!("[YtDlp] Running: {} {}", self.ytdlp_path, args.join(" "));

        let output = run_output_with_timeout(&self.ytdlp_path, args, self.timeout_secs).await?;
        if !output.status.success() {
            return Err(DownloadError::from_stderr(&String::from_utf8_lossy(&output.stderr)));
        }
        Ok(output.stdout)
    }

    /// Pull the direct media URL out of `--dump-json` output
    fn parse_stream_url(stdout: &[u8]) -> Result<String, DownloadError> {
        let json: serde_json::Value = serde_json::from_slice(stdout)
            .map_err(|e| DownloadError::ParseError(format!("Invalid JSON: {}", e)))?;

        match json["url"].as_str() {
            Some(url) if !url.is_empty() => Ok(url.to_string()),
            _ => Err(DownloadError::NoStreamUrl),
        }
    }

    /// Last non-empty stdout line is the path printed by `after_move:filepath`
    fn parse_output_path(stdout: &[u8]) -> Result<PathBuf, DownloadError> {
        String::from_utf8_lossy(stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(PathBuf::from)
            .ok_or(DownloadError::NoOutputFile)
    }
}

#[async_trait]
impl Extractor for YtDlp {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn probe(&self, url: &str, strategy: &ExtractionStrategy) -> Result<String, DownloadError> {
        let args = self.build_args(url, strategy, ExtractionMode::Probe);
        let stdout = self.run(args).await?;
        Self::parse_stream_url(&stdout)
    }

    async fn download(&self, url: &str, strategy: &ExtractionStrategy) -> Result<PathBuf, DownloadError> {
        let args = self.build_args(url, strategy, ExtractionMode::Download);
        let stdout = self.run(args).await?;
        Self::parse_output_path(&stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::strategy::ClientIdentity;

    fn base(name: &'static str) -> ExtractionStrategy {
        ExtractionStrategy {
            name,
            format: "bestaudio[ext=m4a]/bestaudio",
            output_template: Some("downloads/Song.%(ext)s".to_string()),
            cookies: None,
            client: None,
        }
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn download_args_include_template_and_print() {
        let ytdlp = YtDlp::new("yt-dlp", 60);
        let args = ytdlp.build_args("https://www.youtube.com/watch?v=x", &base("plain"), ExtractionMode::Download);

        assert!(has_pair(&args, "-f", "bestaudio[ext=m4a]/bestaudio"));
        assert!(has_pair(&args, "-o", "downloads/Song.%(ext)s"));
        assert!(has_pair(&args, "--print", "after_move:filepath"));
        assert!(args.contains(&"--no-simulate".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://www.youtube.com/watch?v=x"));
    }

    #[test]
    fn probe_args_dump_json_without_output() {
        let ytdlp = YtDlp::new("yt-dlp", 60);
        let args = ytdlp.build_args("u", &base("plain"), ExtractionMode::Probe);

        assert!(args.contains(&"--dump-json".to_string()));
        assert!(!args.contains(&"-o".to_string()));
        assert!(!args.contains(&"--no-simulate".to_string()));
    }

    #[test]
    fn client_identity_becomes_extractor_args_and_headers() {
        let strategy = ExtractionStrategy {
            client: Some(ClientIdentity {
                player_client: "android_embedded",
                headers: vec![("User-Agent", "ua/1.0"), ("X-YouTube-Client-Name", "5")],
                skip: vec!["dash", "hls"],
            }),
            ..base("android")
        };
        let args = YtDlp::new("yt-dlp", 60).build_args("u", &strategy, ExtractionMode::Probe);

        assert!(has_pair(&args, "--extractor-args", "youtube:player_client=android_embedded;skip=dash,hls"));
        assert!(has_pair(&args, "--add-header", "User-Agent:ua/1.0"));
        assert!(has_pair(&args, "--add-header", "X-YouTube-Client-Name:5"));
    }

    #[test]
    fn cookie_sources_and_proxy() {
        let file = ExtractionStrategy {
            cookies: Some(CookieSource::File(PathBuf::from("cookies.txt"))),
            ..base("cookie-file")
        };
        let browser = ExtractionStrategy {
            cookies: Some(CookieSource::Browser("firefox")),
            ..base("firefox")
        };
        let ytdlp = YtDlp::new("yt-dlp", 60).with_proxy(Some("socks5://127.0.0.1:1080".to_string()));

        let args = ytdlp.build_args("u", &file, ExtractionMode::Download);
        assert!(has_pair(&args, "--cookies", "cookies.txt"));
        assert!(has_pair(&args, "--proxy", "socks5://127.0.0.1:1080"));

        let args = ytdlp.build_args("u", &browser, ExtractionMode::Download);
        assert!(has_pair(&args, "--cookies-from-browser", "firefox"));
        assert!(!args.contains(&"--cookies".to_string()));
    }

    #[test]
    fn parses_stream_url_from_json() {
        let json = br#"{"id":"x","title":"t","url":"https://rr1.googlevideo.com/videoplayback?x=1"}"#;
        assert_eq!(
            YtDlp::parse_stream_url(json).unwrap(),
            "https://rr1.googlevideo.com/videoplayback?x=1"
        );
        assert!(matches!(
            YtDlp::parse_stream_url(br#"{"id":"x"}"#),
            Err(DownloadError::NoStreamUrl)
        ));
        assert!(matches!(
            YtDlp::parse_stream_url(b"not json"),
            Err(DownloadError::ParseError(_))
        ));
    }

    #[test]
    fn parses_final_path_from_print_output() {
        let stdout = b"\ndownloads/My Song.m4a\n";
        assert_eq!(
            YtDlp::parse_output_path(stdout).unwrap(),
            PathBuf::from("downloads/My Song.m4a")
        );
        assert!(matches!(YtDlp::parse_output_path(b"  \n"), Err(DownloadError::NoOutputFile)));
    }

    #[tokio::test]
    async fn missing_binary_fails_the_strategy() {
        let ytdlp = YtDlp::new("definitely-not-a-real-binary-xyz", 5);
        let err = ytdlp.probe("u", &base("plain")).await.unwrap_err();
        assert!(matches!(err, DownloadError::ToolNotFound(_)));
    }
}
