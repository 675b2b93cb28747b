// InfoExtractor Orchestrator - mode selection and fallback
//
// Strategy:
// 1. Explicit mode: use that launcher only
// 2. Auto: native binary first (faster), Python module as fallback
// 3. Fall back only on tool/extraction failures, never on a successful empty result

use async_trait::async_trait;

use super::cli::CliInfoExtractor;
use super::python::PythonInfoExtractor;
use super::traits::{ExtractorConfig, ExtractorMode, InfoExtractor};
use crate::downloader::errors::PickerError;
use crate::downloader::models::ExtractionResult;

/// Orchestrator that manages Python and CLI extractors
pub struct InfoExtractorOrchestrator {
    python: Box<dyn InfoExtractor>,
    cli: Box<dyn InfoExtractor>,
}

impl InfoExtractorOrchestrator {
    pub fn new(ytdlp_path: impl Into<String>, python_cmd: impl Into<String>) -> Self {
        Self::from_parts(
            Box::new(CliInfoExtractor::with_path(ytdlp_path)),
            Box::new(PythonInfoExtractor::with_python(python_cmd)),
        )
    }

    pub fn from_parts(cli: Box<dyn InfoExtractor>, python: Box<dyn InfoExtractor>) -> Self {
        Self { python, cli }
    }

    /// Launch order for a mode
    fn order(&self, mode: ExtractorMode) -> Vec<&dyn InfoExtractor> {
        match mode {
            ExtractorMode::Cli => vec![self.cli.as_ref()],
            ExtractorMode::Python => vec![self.python.as_ref()],
            ExtractorMode::Auto => vec![self.cli.as_ref(), self.python.as_ref()],
        }
    }
}

#[async_trait]
impl InfoExtractor for InfoExtractorOrchestrator {
    fn name(&self) -> &'static str {
        "orchestrator"
    }

    fn is_available(&self) -> bool {
        self.cli.is_available() || self.python.is_available()
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<ExtractionResult, PickerError> {
        let mut last_error = None;

        for extractor in self.order(config.mode) {
            tracing::info!("[Orchestrator] Trying {} for {}", extractor.name(), url);
            match extractor.extract(url, config).await {
                Ok(result) => {
                    tracing::info!("[Orchestrator] {} succeeded", extractor.name());
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!("[Orchestrator] {} failed: {}", extractor.name(), e);
                    // A missing fallback tool must not hide the real extraction error
                    let keep_previous = matches!(e, PickerError::ToolNotFound(_)) && last_error.is_some();
                    if !keep_previous {
                        last_error = Some(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PickerError::ToolNotFound("Neither yt-dlp binary nor Python yt_dlp module available".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Canned {
        name: &'static str,
        result: Option<serde_json::Value>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl InfoExtractor for Canned {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn extract(&self, _url: &str, _config: &ExtractorConfig) -> Result<ExtractionResult, PickerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Some(v) => Ok(ExtractionResult::new(v.clone())),
                None => Err(PickerError::ToolNotFound(self.name.to_string())),
            }
        }
    }

    fn canned(name: &'static str, result: Option<serde_json::Value>) -> (Box<dyn InfoExtractor>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Box::new(Canned { name, result, calls: calls.clone() }), calls)
    }

    #[tokio::test]
    async fn auto_falls_back_to_python() {
        let (cli, cli_calls) = canned("cli", None);
        let (python, python_calls) = canned("python", Some(json!({"title": "ok"})));
        let orchestrator = InfoExtractorOrchestrator::from_parts(cli, python);

        let result = orchestrator.extract("u", &ExtractorConfig::default()).await.unwrap();
        assert_eq!(result.title(), Some("ok"));
        assert_eq!(cli_calls.load(Ordering::SeqCst), 1);
        assert_eq!(python_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_fallback_keeps_first_error() {
        struct Private;

        #[async_trait]
        impl InfoExtractor for Private {
            fn name(&self) -> &'static str {
                "cli"
            }

            fn is_available(&self) -> bool {
                true
            }

            async fn extract(&self, _url: &str, _config: &ExtractorConfig) -> Result<ExtractionResult, PickerError> {
                Err(PickerError::extraction("ERROR: [youtube] x: Private video"))
            }
        }

        let (python, _) = canned("python", None);
        let orchestrator = InfoExtractorOrchestrator::from_parts(Box::new(Private), python);
        let err = orchestrator.extract("u", &ExtractorConfig::default()).await.unwrap_err();
        assert_eq!(err.kind(), "extraction_failed");
    }

    #[tokio::test]
    async fn explicit_mode_does_not_fall_back() {
        let (cli, _) = canned("cli", None);
        let (python, python_calls) = canned("python", Some(json!({})));
        let orchestrator = InfoExtractorOrchestrator::from_parts(cli, python);

        let config = ExtractorConfig::default().with_mode(ExtractorMode::Cli);
        let err = orchestrator.extract("u", &config).await.unwrap_err();
        assert_eq!(err.kind(), "tool_not_found");
        assert_eq!(python_calls.load(Ordering::SeqCst), 0);
    }
}
