// Strategy builder - ordered yt-dlp configurations to try against bot checks
//
// Order matters: an exported cookie file is the most reliable way past
// "confirm you're not a bot", then the simulated mobile/TV clients, then the
// plain web client, and finally cookies pulled straight from a local browser.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::models::FormatClass;

pub const ANDROID_USER_AGENT: &str =
    "com.google.android.youtube/19.09.37 (Linux; U; Android 13; en_US)";
pub const IOS_USER_AGENT: &str =
    "com.google.ios.youtube/19.29.1 (iPhone16,2; U; CPU iOS 17_5_1 like Mac OS X;)";
pub const IOS_CLIENT_VERSION: &str = "19.29.1";
pub const WEB_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Where yt-dlp should take cookies from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieSource {
    /// Netscape cookies.txt exported by the user
    File(PathBuf),
    /// Browser name understood by `--cookies-from-browser`
    Browser(&'static str),
}

/// Simulated YouTube client: `player_client` extractor argument plus the
/// HTTP headers that client would send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub player_client: &'static str,
    pub headers: Vec<(&'static str, &'static str)>,
    /// Manifest types yt-dlp should not request (`dash`, `hls`)
    pub skip: Vec<&'static str>,
}

/// One complete configuration attempted as a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionStrategy {
    pub name: &'static str,
    pub format: &'static str,
    pub output_template: Option<String>,
    pub cookies: Option<CookieSource>,
    pub client: Option<ClientIdentity>,
}

/// Strategies in priority order, plus what the builder saw on disk
#[derive(Debug, Clone)]
pub struct StrategyPlan {
    pub strategies: Vec<ExtractionStrategy>,
    pub cookie_file_present: bool,
}

impl StrategyPlan {
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name).collect()
    }
}

/// A strategy whose preconditions do not hold in this environment.
/// The builder drops it and keeps going.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StrategyUnavailable(pub String);

/// Answers whether a browser profile exists that yt-dlp could read cookies from
pub trait BrowserProbe: Send + Sync {
    fn has_profile(&self, browser: &str) -> bool;
}

/// Looks for browser profile directories in the usual per-OS locations
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalBrowserProfiles;

impl LocalBrowserProfiles {
    fn candidate_dirs(browser: &str) -> Vec<PathBuf> {
        let mut dirs_out = Vec::new();
        let home = dirs::home_dir();
        let config = dirs::config_dir();
        let local = dirs::data_local_dir();

        match browser {
            "chrome" => {
                // Linux ~/.config/google-chrome, macOS ~/Library/Application Support/Google/Chrome
                if let Some(c) = &config {
                    dirs_out.push(c.join("google-chrome"));
                    dirs_out.push(c.join("Google").join("Chrome"));
                }
                if let Some(l) = &local {
                    dirs_out.push(l.join("Google").join("Chrome").join("User Data"));
                }
            }
            "firefox" => {
                if let Some(h) = &home {
                    dirs_out.push(h.join(".mozilla").join("firefox"));
                    dirs_out.push(h.join("snap").join("firefox").join("common").join(".mozilla").join("firefox"));
                }
                if let Some(c) = &config {
                    dirs_out.push(c.join("Firefox"));
                    dirs_out.push(c.join("Mozilla").join("Firefox"));
                }
            }
            _ => {}
        }

        dirs_out
    }
}

impl BrowserProbe for LocalBrowserProfiles {
    fn has_profile(&self, browser: &str) -> bool {
        Self::candidate_dirs(browser).iter().any(|p| p.is_dir())
    }
}

/// Settings every strategy starts from
#[derive(Debug, Clone)]
struct BaseOptions {
    format: &'static str,
    output_template: Option<String>,
}

impl BaseOptions {
    fn strategy(&self, name: &'static str) -> ExtractionStrategy {
        ExtractionStrategy {
            name,
            format: self.format,
            output_template: self.output_template.clone(),
            cookies: None,
            client: None,
        }
    }
}

type StrategyFactory =
    fn(&StrategyBuilder, &BaseOptions) -> Result<ExtractionStrategy, StrategyUnavailable>;

/// Priority order. Each factory runs only when the plan is built.
const FACTORIES: &[StrategyFactory] = &[
    StrategyBuilder::cookie_file_strategy,
    StrategyBuilder::android_embedded,
    StrategyBuilder::ios,
    StrategyBuilder::tv_embedded,
    StrategyBuilder::web,
    StrategyBuilder::chrome_cookies,
    StrategyBuilder::firefox_cookies,
];

#[derive(Clone)]
pub struct StrategyBuilder {
    cookie_file: PathBuf,
    browser_cookies: bool,
    browsers: Arc<dyn BrowserProbe>,
}

impl StrategyBuilder {
    pub fn new(cookie_file: impl Into<PathBuf>, browser_cookies: bool) -> Self {
        Self {
            cookie_file: cookie_file.into(),
            browser_cookies,
            browsers: Arc::new(LocalBrowserProfiles),
        }
    }

    pub fn with_browser_probe(mut self, probe: Arc<dyn BrowserProbe>) -> Self {
        self.browsers = probe;
        self
    }

    pub fn cookie_file_present(&self) -> bool {
        self.cookie_file.exists()
    }

    /// Build the ordered plan for a format and optional output template
    pub fn build(&self, format: FormatClass, output_template: Option<String>) -> StrategyPlan {
        let base = BaseOptions {
            format: format.selector(),
            output_template,
        };

        let mut strategies = Vec::with_capacity(FACTORIES.len());
        for factory in FACTORIES {
            match factory(self, &base) {
                Ok(strategy) => strategies.push(strategy),
                Err(StrategyUnavailable(reason)) => {
                    debug!("[Strategy] skipped: {}", reason);
                }
            }
        }

        let cookie_file_present = strategies
            .first()
            .is_some_and(|s| matches!(s.cookies, Some(CookieSource::File(_))));

        StrategyPlan {
            strategies,
            cookie_file_present,
        }
    }

    fn cookie_file_strategy(&self, base: &BaseOptions) -> Result<ExtractionStrategy, StrategyUnavailable> {
        if !self.cookie_file_present() {
            return Err(StrategyUnavailable(format!(
                "cookie file {} not found",
                self.cookie_file.display()
            )));
        }
        Ok(ExtractionStrategy {
            cookies: Some(CookieSource::File(self.cookie_file.clone())),
            ..base.strategy("cookie-file")
        })
    }

    fn android_embedded(&self, base: &BaseOptions) -> Result<ExtractionStrategy, StrategyUnavailable> {
        Ok(ExtractionStrategy {
            client: Some(ClientIdentity {
                player_client: "android_embedded",
                headers: vec![("User-Agent", ANDROID_USER_AGENT)],
                skip: vec!["dash", "hls"],
            }),
            ..base.strategy("android-embedded")
        })
    }

    fn ios(&self, base: &BaseOptions) -> Result<ExtractionStrategy, StrategyUnavailable> {
        Ok(ExtractionStrategy {
            client: Some(ClientIdentity {
                player_client: "ios",
                headers: vec![
                    ("User-Agent", IOS_USER_AGENT),
                    ("X-YouTube-Client-Name", "5"),
                    ("X-YouTube-Client-Version", IOS_CLIENT_VERSION),
                ],
                skip: Vec::new(),
            }),
            ..base.strategy("ios")
        })
    }

    fn tv_embedded(&self, base: &BaseOptions) -> Result<ExtractionStrategy, StrategyUnavailable> {
        Ok(ExtractionStrategy {
            client: Some(ClientIdentity {
                player_client: "tv_embedded",
                headers: Vec::new(),
                skip: Vec::new(),
            }),
            ..base.strategy("tv-embedded")
        })
    }

    fn web(&self, base: &BaseOptions) -> Result<ExtractionStrategy, StrategyUnavailable> {
        Ok(ExtractionStrategy {
            client: Some(ClientIdentity {
                player_client: "web",
                headers: vec![
                    ("User-Agent", WEB_USER_AGENT),
                    ("Accept-Language", "en-US,en;q=0.9"),
                ],
                skip: Vec::new(),
            }),
            ..base.strategy("web")
        })
    }

    fn browser_cookies(
        &self,
        base: &BaseOptions,
        name: &'static str,
        browser: &'static str,
    ) -> Result<ExtractionStrategy, StrategyUnavailable> {
        if !self.browser_cookies {
            return Err(StrategyUnavailable(format!("{} cookies disabled", browser)));
        }
        if !self.browsers.has_profile(browser) {
            return Err(StrategyUnavailable(format!("no {} profile found", browser)));
        }
        Ok(ExtractionStrategy {
            cookies: Some(CookieSource::Browser(browser)),
            ..base.strategy(name)
        })
    }

    fn chrome_cookies(&self, base: &BaseOptions) -> Result<ExtractionStrategy, StrategyUnavailable> {
        self.browser_cookies(base, "chrome-cookies", "chrome")
    }

    fn firefox_cookies(&self, base: &BaseOptions) -> Result<ExtractionStrategy, StrategyUnavailable> {
        self.browser_cookies(base, "firefox-cookies", "firefox")
    }
}

impl std::fmt::Debug for StrategyBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyBuilder")
            .field("cookie_file", &self.cookie_file)
            .field("browser_cookies", &self.browser_cookies)
            .finish()
    }
}
