// Runtime configuration from environment variables

use std::net::IpAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DOWNLOADS_DIR: &str = "downloads";
pub const DEFAULT_COOKIES_FILE: &str = "cookies.txt";
pub const DEFAULT_YTDLP_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub downloads_dir: PathBuf,
    pub cookies_file: PathBuf,
    /// Explicit yt-dlp binary; auto-detected when unset
    pub ytdlp_path: Option<String>,
    pub ytdlp_timeout_secs: u64,
    /// Allow the `--cookies-from-browser` strategies
    pub browser_cookies: bool,
    /// Proxy for yt-dlp and the search client
    pub proxy: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            downloads_dir: PathBuf::from(DEFAULT_DOWNLOADS_DIR),
            cookies_file: PathBuf::from(DEFAULT_COOKIES_FILE),
            ytdlp_path: None,
            ytdlp_timeout_secs: DEFAULT_YTDLP_TIMEOUT_SECS,
            browser_cookies: true,
            proxy: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            host: match get("HOST") {
                Some(v) => parse("HOST", v)?,
                None => defaults.host,
            },
            port: match get("PORT") {
                Some(v) => parse("PORT", v)?,
                None => defaults.port,
            },
            downloads_dir: get("DOWNLOADS_DIR").map(PathBuf::from).unwrap_or(defaults.downloads_dir),
            cookies_file: get("COOKIES_FILE").map(PathBuf::from).unwrap_or(defaults.cookies_file),
            ytdlp_path: get("YTDLP_PATH"),
            ytdlp_timeout_secs: match get("YTDLP_TIMEOUT_SECS") {
                Some(v) => parse("YTDLP_TIMEOUT_SECS", v)?,
                None => defaults.ytdlp_timeout_secs,
            },
            browser_cookies: match get("BROWSER_COOKIES") {
                Some(v) => parse_flag("BROWSER_COOKIES", v)?,
                None => defaults.browser_cookies,
            },
            proxy: get("PROXY"),
        })
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}
