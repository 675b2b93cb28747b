// Python InfoExtractor - uses `python3 -m yt_dlp`
//
// Useful when only the pip package is installed, or when a venv carries a
// newer yt-dlp than the system binary.

use async_trait::async_trait;

use super::cli::extract_with;
use super::traits::{ExtractorConfig, InfoExtractor};
use crate::downloader::errors::PickerError;
use crate::downloader::models::ExtractionResult;
use crate::downloader::tools::Launcher;

/// Python-based info extractor using yt_dlp module
pub struct PythonInfoExtractor {
    launcher: Launcher,
}

impl PythonInfoExtractor {
    pub fn with_python(python_cmd: impl Into<String>) -> Self {
        Self {
            launcher: Launcher::PythonModule(python_cmd.into()),
        }
    }
}

#[async_trait]
impl InfoExtractor for PythonInfoExtractor {
    fn name(&self) -> &'static str {
        "python-yt-dlp"
    }

    fn is_available(&self) -> bool {
        self.launcher.is_available()
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<ExtractionResult, PickerError> {
        if !self.is_available() {
            return Err(PickerError::ToolNotFound(
                "Python yt_dlp module not installed".to_string(),
            ));
        }
        extract_with(&self.launcher, self.name(), url, config).await
    }
}
