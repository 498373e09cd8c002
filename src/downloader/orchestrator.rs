// Orchestrator with fallback logic

use std::sync::Arc;

use tracing::{info, warn};

use super::diagnostics::diagnose_error;
use super::errors::DownloadError;
use super::models::{ExtractionExhausted, ExtractionMode, ExtractionOutput, ExtractionSuccess};
use super::strategy::{ExtractionStrategy, StrategyPlan};
use super::traits::Extractor;
use super::utils::watch_url;

/// Walks a strategy plan in order until one strategy produces a result.
/// Each strategy is attempted exactly once; every error counts as
/// "try the next one".
#[derive(Clone)]
pub struct Downloader {
    extractor: Arc<dyn Extractor>,
}

impl Downloader {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }

    pub async fn run(
        &self,
        video_id: &str,
        plan: &StrategyPlan,
        mode: ExtractionMode,
    ) -> Result<ExtractionSuccess, ExtractionExhausted> {
        let url = watch_url(video_id);
        let total = plan.len();
        let mut last_error: Option<String> = None;
        let mut attempts = 0;

        for (idx, strategy) in plan.strategies.iter().enumerate() {
            let number = idx + 1;
            attempts += 1;
            info!(
                "[Downloader] {} {} with strategy {}/{} ({}) via {}",
                mode,
                video_id,
                number,
                total,
                strategy.name,
                self.extractor.name()
            );

            match self.attempt(&url, strategy, mode).await {
                Ok(output) => {
                    info!("[Downloader] ✓ strategy {} ({}) succeeded", number, strategy.name);
                    return Ok(ExtractionSuccess {
                        strategy_number: number,
                        strategy_name: strategy.name,
                        output,
                    });
                }
                Err(e) => {
                    let message = e.to_string();
                    match diagnose_error(&message) {
                        Some(reason) => warn!(
                            "[Downloader] ✗ strategy {} ({}) failed [{}]: {}",
                            number, strategy.name, reason, message
                        ),
                        None => warn!(
                            "[Downloader] ✗ strategy {} ({}) failed: {}",
                            number, strategy.name, message
                        ),
                    }
                    last_error = Some(message);
                }
            }
        }

        warn!("[Downloader] all {} strategies failed for {}", attempts, video_id);
        if cookie_file_would_help(last_error.as_deref(), plan.cookie_file_present) {
            warn!("[Downloader] last failure is a block a cookies file usually gets past");
        }
        Err(ExtractionExhausted {
            mode,
            last_error,
            attempts,
            cookie_file_present: plan.cookie_file_present,
        })
    }

    async fn attempt(
        &self,
        url: &str,
        strategy: &ExtractionStrategy,
        mode: ExtractionMode,
    ) -> Result<ExtractionOutput, DownloadError> {
        match mode {
            ExtractionMode::Probe => {
                let stream_url = self.extractor.probe(url, strategy).await?;
                if stream_url.trim().is_empty() {
                    return Err(DownloadError::NoStreamUrl);
                }
                Ok(ExtractionOutput::StreamUrl(stream_url))
            }
            ExtractionMode::Download => {
                let path = self.extractor.download(url, strategy).await?;
                Ok(ExtractionOutput::File(path))
            }
        }
    }
}

/// No cookie file was available and the last failure is one cookies tend to fix
fn cookie_file_would_help(last_error: Option<&str>, cookie_file_present: bool) -> bool {
    !cookie_file_present
        && last_error
            .and_then(diagnose_error)
            .is_some_and(|reason| reason.cookies_might_help())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Scripted extractor: fails for the listed strategy names, records calls
    struct ScriptedExtractor {
        failing: Vec<&'static str>,
        calls: Mutex<Vec<&'static str>>,
        empty_probe: bool,
    }

    impl ScriptedExtractor {
        fn failing(failing: Vec<&'static str>) -> Self {
            Self {
                failing,
                calls: Mutex::new(Vec::new()),
                empty_probe: false,
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn check(&self, strategy: &ExtractionStrategy) -> Result<(), DownloadError> {
            self.calls.lock().unwrap().push(strategy.name);
            if self.failing.contains(&strategy.name) {
                return Err(DownloadError::ExtractorFailed(format!("{} blocked", strategy.name)));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Extractor for ScriptedExtractor {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn probe(&self, url: &str, strategy: &ExtractionStrategy) -> Result<String, DownloadError> {
            self.check(strategy)?;
            if self.empty_probe {
                return Ok(String::new());
            }
            Ok(format!("{}&stream={}", url, strategy.name))
        }

        async fn download(&self, _url: &str, strategy: &ExtractionStrategy) -> Result<PathBuf, DownloadError> {
            self.check(strategy)?;
            Ok(PathBuf::from(format!("downloads/{}.m4a", strategy.name)))
        }
    }

    fn strategy(name: &'static str) -> ExtractionStrategy {
        ExtractionStrategy {
            name,
            format: "bestaudio",
            output_template: None,
            cookies: None,
            client: None,
        }
    }

    fn plan(names: &[&'static str]) -> StrategyPlan {
        StrategyPlan {
            strategies: names.iter().map(|n| strategy(*n)).collect(),
            cookie_file_present: false,
        }
    }

    #[tokio::test]
    async fn last_strategy_wins_after_earlier_failures() {
        let extractor = Arc::new(ScriptedExtractor::failing(vec!["a", "b", "c"]));
        let downloader = Downloader::new(extractor.clone());

        let success = downloader
            .run("vid", &plan(&["a", "b", "c", "d"]), ExtractionMode::Download)
            .await
            .unwrap();

        assert_eq!(success.strategy_number, 4);
        assert_eq!(success.strategy_name, "d");
        assert_eq!(success.method_label(), "Strategy 4");
        assert_eq!(success.output, ExtractionOutput::File(PathBuf::from("downloads/d.m4a")));
        assert_eq!(extractor.calls(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let extractor = Arc::new(ScriptedExtractor::failing(vec!["a"]));
        let downloader = Downloader::new(extractor.clone());

        let success = downloader
            .run("vid", &plan(&["a", "b", "c"]), ExtractionMode::Probe)
            .await
            .unwrap();

        assert_eq!(success.strategy_number, 2);
        assert_eq!(
            success.output,
            ExtractionOutput::StreamUrl("https://www.youtube.com/watch?v=vid&stream=b".to_string())
        );
        assert_eq!(extractor.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn all_failures_report_the_last_error() {
        let extractor = Arc::new(ScriptedExtractor::failing(vec!["a", "b", "c"]));
        let downloader = Downloader::new(extractor.clone());

        let exhausted = downloader
            .run("vid", &plan(&["a", "b", "c"]), ExtractionMode::Download)
            .await
            .unwrap_err();

        assert_eq!(exhausted.last_error.as_deref(), Some("c blocked"));
        assert_eq!(exhausted.attempts, 3);
        assert!(!exhausted.cookie_file_present);
        assert_eq!(extractor.calls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn empty_probe_result_counts_as_failure() {
        let extractor = Arc::new(ScriptedExtractor {
            empty_probe: true,
            ..ScriptedExtractor::failing(Vec::new())
        });
        let downloader = Downloader::new(extractor.clone());

        let exhausted = downloader
            .run("vid", &plan(&["a", "b"]), ExtractionMode::Probe)
            .await
            .unwrap_err();

        assert_eq!(exhausted.last_error.as_deref(), Some("No stream URL in extractor response"));
        assert_eq!(extractor.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn empty_plan_is_exhausted_immediately() {
        let downloader = Downloader::new(Arc::new(ScriptedExtractor::failing(Vec::new())));
        let exhausted = downloader
            .run("vid", &plan(&[]), ExtractionMode::Probe)
            .await
            .unwrap_err();

        assert_eq!(exhausted.attempts, 0);
        assert_eq!(exhausted.last_error_message(), "no strategies were attempted");
    }

    #[test]
    fn cookie_advice_only_for_cookie_fixable_blocks() {
        let bot = "ERROR: [youtube] x: Sign in to confirm you're not a bot";
        assert!(cookie_file_would_help(Some(bot), false));
        assert!(!cookie_file_would_help(Some(bot), true));
        assert!(!cookie_file_would_help(Some("ERROR: Video unavailable"), false));
        assert!(!cookie_file_would_help(None, false));
    }
}
