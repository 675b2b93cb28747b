// CLI InfoExtractor - uses native `yt-dlp` binary

use async_trait::async_trait;

use super::traits::{extraction_args, parse_extraction, ExtractorConfig, InfoExtractor};
use crate::downloader::errors::PickerError;
use crate::downloader::models::ExtractionResult;
use crate::downloader::tools::Launcher;
use crate::downloader::utils::{run_output_with_timeout, ProcessError};

/// CLI-based info extractor using yt-dlp binary
pub struct CliInfoExtractor {
    launcher: Launcher,
}

impl CliInfoExtractor {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            launcher: Launcher::Binary(path.into()),
        }
    }
}

/// Run one metadata dump through `launcher`. Shared by the CLI and Python extractors.
pub(super) async fn extract_with(
    launcher: &Launcher,
    tag: &str,
    url: &str,
    config: &ExtractorConfig,
) -> Result<ExtractionResult, PickerError> {
    let args = launcher.args(extraction_args(url, config));
    tracing::debug!("[{}] {} {}", tag, launcher.program(), args.join(" "));

    let output = run_output_with_timeout(launcher.program(), args, config.timeout_seconds)
        .await
        .map_err(|e| match e {
            ProcessError::Spawn { program, .. } => PickerError::ToolNotFound(program),
            other => PickerError::ExtractionFailed {
                message: other.to_string(),
                reason: None,
            },
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);

    // With --ignore-errors a playlist with dead entries exits non-zero but
    // still prints the document, so stdout decides.
    match parse_extraction(&output.stdout)? {
        Some(result) => {
            if !output.status.success() {
                tracing::warn!(
                    "[{}] yt-dlp exited with {} but returned metadata: {}",
                    tag,
                    output.status,
                    stderr.lines().next().unwrap_or_default()
                );
            }
            Ok(result)
        }
        None => {
            tracing::warn!("[{}] no metadata for {}: {}", tag, url, stderr.trim());
            Err(PickerError::extraction(&stderr))
        }
    }
}

#[async_trait]
impl InfoExtractor for CliInfoExtractor {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    fn is_available(&self) -> bool {
        self.launcher.is_available()
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<ExtractionResult, PickerError> {
        extract_with(&self.launcher, self.name(), url, config).await
    }
}
