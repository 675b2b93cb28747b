// Application configuration: defaults, environment overrides, builder methods

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::downloader::extractors::{ExtractorConfig, ExtractorMode};
use crate::downloader::models::{DownloadOptions, NetworkConfig};
use crate::downloader::tools::{find_python, find_ytdlp};

/// Socket timeout handed to yt-dlp for every network call
const SOCKET_TIMEOUT_SECS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extractor_mode: ExtractorMode,
    pub ytdlp_path: String,
    pub python_cmd: String,
    /// Parent of the per-session staging directories
    pub staging_root: PathBuf,
    /// Where exported files and archives go unless the user picks a path
    pub export_dir: PathBuf,
    pub skip_cert_check: bool,
    pub add_number: bool,
    pub proxy: Option<String>,
    pub cookies_path: Option<String>,
    pub cookies_from_browser: Option<String>,
    pub analyze_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub diagnostics_excerpt_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extractor_mode: ExtractorMode::Auto,
            ytdlp_path: "yt-dlp".to_string(),
            python_cmd: "python3".to_string(),
            staging_root: std::env::temp_dir().join("youtube-mp3-picker"),
            export_dir: default_export_dir(),
            skip_cert_check: true,
            add_number: true,
            proxy: None,
            cookies_path: None,
            cookies_from_browser: None,
            analyze_timeout_secs: 120,
            download_timeout_secs: 3600,
            diagnostics_excerpt_chars: 2000,
        }
    }
}

fn default_export_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
}

impl AppConfig {
    /// Defaults with tool discovery, overridden by `YTMP3_*` / `YTDLP_*` variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(mode) = var("YTMP3_EXTRACTOR") {
            match mode.parse() {
                Ok(mode) => config.extractor_mode = mode,
                Err(e) => tracing::warn!("[config] ignoring YTMP3_EXTRACTOR: {}", e),
            }
        }

        config.ytdlp_path = var("YTDLP_PATH").unwrap_or_else(find_ytdlp);
        config.python_cmd = var("YTDLP_PYTHON").unwrap_or_else(find_python);

        if let Some(dir) = var("YTMP3_STAGING_DIR") {
            config.staging_root = PathBuf::from(dir);
        }
        if let Some(dir) = var("YTMP3_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }
        if var("YTMP3_CHECK_CERTS").as_deref() == Some("1") {
            config.skip_cert_check = false;
        }

        config.proxy = var("YTMP3_PROXY");
        config.cookies_path = var("YTMP3_COOKIES");
        config.cookies_from_browser = var("YTMP3_COOKIES_BROWSER");

        if let Some(secs) = var("YTMP3_ANALYZE_TIMEOUT").and_then(|v| parse_secs("YTMP3_ANALYZE_TIMEOUT", &v)) {
            config.analyze_timeout_secs = secs;
        }
        if let Some(secs) = var("YTMP3_DOWNLOAD_TIMEOUT").and_then(|v| parse_secs("YTMP3_DOWNLOAD_TIMEOUT", &v)) {
            config.download_timeout_secs = secs;
        }

        config
    }

    pub fn with_extractor_mode(mut self, mode: ExtractorMode) -> Self {
        self.extractor_mode = mode;
        self
    }

    pub fn with_staging_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_root = dir.into();
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn network(&self) -> NetworkConfig {
        NetworkConfig {
            proxy: self.proxy.clone(),
            cookies_path: self.cookies_path.clone(),
            cookies_from_browser: self.cookies_from_browser.clone(),
            skip_cert_check: self.skip_cert_check,
            socket_timeout: Some(SOCKET_TIMEOUT_SECS),
        }
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig::default()
            .with_mode(self.extractor_mode)
            .with_network(self.network())
            .with_timeout(self.analyze_timeout_secs)
    }

    /// Options for one run writing into `staging_dir`
    pub fn download_options(&self, staging_dir: PathBuf) -> DownloadOptions {
        DownloadOptions {
            staging_dir,
            network: self.network(),
            timeout_seconds: self.download_timeout_secs,
        }
    }
}

fn parse_secs(key: &str, value: &str) -> Option<u64> {
    match value.parse::<u64>() {
        Ok(0) | Err(_) => {
            tracing::warn!("[config] ignoring {}={:?}, expected a positive number of seconds", key, value);
            None
        }
        Ok(secs) => Some(secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.extractor_mode, ExtractorMode::Auto);
        assert!(config.skip_cert_check);
        assert!(config.add_number);
        assert_eq!(config.analyze_timeout_secs, 120);
        assert_eq!(config.download_timeout_secs, 3600);
        assert_eq!(config.diagnostics_excerpt_chars, 2000);
        assert!(config.staging_root.ends_with("youtube-mp3-picker"));
    }

    #[test]
    fn environment_overrides_apply() {
        let config = AppConfig::from_lookup(lookup(&[
            ("YTMP3_EXTRACTOR", "python"),
            ("YTDLP_PATH", "/opt/bin/yt-dlp"),
            ("YTDLP_PYTHON", "/venv/bin/python"),
            ("YTMP3_STAGING_DIR", "/tmp/stage"),
            ("YTMP3_CHECK_CERTS", "1"),
            ("YTMP3_PROXY", "socks5://127.0.0.1:1080"),
            ("YTMP3_COOKIES_BROWSER", "firefox"),
            ("YTMP3_ANALYZE_TIMEOUT", "30"),
        ]));

        assert_eq!(config.extractor_mode, ExtractorMode::Python);
        assert_eq!(config.ytdlp_path, "/opt/bin/yt-dlp");
        assert_eq!(config.python_cmd, "/venv/bin/python");
        assert_eq!(config.staging_root, PathBuf::from("/tmp/stage"));
        assert!(!config.skip_cert_check);
        assert_eq!(config.analyze_timeout_secs, 30);

        let network = config.network();
        assert_eq!(network.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
        assert_eq!(network.cookies_from_browser.as_deref(), Some("firefox"));
        assert!(!network.skip_cert_check);
    }

    #[test]
    fn bad_values_keep_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("YTDLP_PATH", "yt-dlp"),
            ("YTDLP_PYTHON", "python3"),
            ("YTMP3_EXTRACTOR", "banana"),
            ("YTMP3_DOWNLOAD_TIMEOUT", "0"),
            ("YTMP3_PROXY", "   "),
        ]));
        assert_eq!(config.extractor_mode, ExtractorMode::Auto);
        assert_eq!(config.download_timeout_secs, 3600);
        assert_eq!(config.proxy, None);
    }

    #[test]
    fn extractor_config_carries_network_and_timeout() {
        let config = AppConfig::default()
            .with_extractor_mode(ExtractorMode::Cli)
            .with_proxy(Some("http://proxy:8080".to_string()));
        let extractor = config.extractor_config();
        assert_eq!(extractor.mode, ExtractorMode::Cli);
        assert_eq!(extractor.timeout_seconds, 120);
        assert_eq!(extractor.network.proxy.as_deref(), Some("http://proxy:8080"));
        assert_eq!(extractor.network.socket_timeout, Some(30));
    }
}
