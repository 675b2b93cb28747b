// InfoExtractor trait and common types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::downloader::errors::PickerError;
use crate::downloader::models::{ExtractionResult, NetworkConfig};
use crate::downloader::utils::network_args;

/// Extraction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorMode {
    /// Python module yt_dlp
    Python,
    /// CLI binary yt-dlp
    Cli,
    /// Auto-select with fallback to the other launcher
    #[default]
    Auto,
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Cli => write!(f, "cli"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ExtractorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "cli" => Ok(Self::Cli),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown extractor mode: {}", other)),
        }
    }
}

/// Configuration for info extraction
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub mode: ExtractorMode,
    pub network: NetworkConfig,
    /// Whole-process timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::Auto,
            network: NetworkConfig {
                skip_cert_check: true,
                socket_timeout: Some(30),
                ..NetworkConfig::default()
            },
            timeout_seconds: 120,
        }
    }
}

impl ExtractorConfig {
    pub fn with_mode(mut self, mode: ExtractorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// Trait for info extractors
#[async_trait]
pub trait InfoExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Check if this extractor is available
    fn is_available(&self) -> bool;

    /// Fetch flat metadata for a URL (video, playlist or chaptered video)
    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<ExtractionResult, PickerError>;
}

/// yt-dlp arguments for a flat, single-document metadata dump
pub fn extraction_args(url: &str, config: &ExtractorConfig) -> Vec<String> {
    let mut args = vec![
        "-J".to_string(),
        "--flat-playlist".to_string(),
        "--ignore-errors".to_string(),
        "--no-warnings".to_string(),
        "--quiet".to_string(),
    ];
    args.extend(network_args(&config.network));
    args.push("--".to_string());
    args.push(url.to_string());
    args
}

/// Parse `-J` output. Empty output and `null` both count as "nothing extracted".
pub fn parse_extraction(stdout: &[u8]) -> Result<Option<ExtractionResult>, PickerError> {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let json: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| PickerError::ExtractionFailed {
        message: format!("Invalid JSON from yt-dlp: {}", e),
        reason: None,
    })?;

    if json.is_null() {
        return Ok(None);
    }
    Ok(Some(ExtractionResult::new(json)))
}
