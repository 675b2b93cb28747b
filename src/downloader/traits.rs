// Downloader backend trait definition

use async_trait::async_trait;

use super::errors::PickerError;
use super::models::{DownloadOptions, DownloadPlan, DownloadProgress};

/// Trait for downloader backend implementations
#[async_trait]
pub trait DownloaderBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Run one batch download into `options.staging_dir`.
    ///
    /// Per-item failures inside the batch are not errors; only a run that
    /// could not start or did not finish is.
    async fn download(
        &self,
        plan: &DownloadPlan,
        options: &DownloadOptions,
        progress: &dyn ProgressSink,
    ) -> Result<(), PickerError>;
}

/// Receives progress updates while a download runs
pub trait ProgressSink: Send + Sync {
    fn emit(&self, progress: DownloadProgress);
}

/// Drops every update
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn emit(&self, _progress: DownloadProgress) {}
}

impl<F> ProgressSink for F
where
    F: Fn(DownloadProgress) + Send + Sync,
{
    fn emit(&self, progress: DownloadProgress) {
        self(progress)
    }
}
