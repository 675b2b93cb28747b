// Downloader module - analyze a URL, pick items, fetch them as MP3 through yt-dlp

pub mod backends;
pub mod classifier;
pub mod errors;
pub mod extractors;
pub mod models;
pub mod normalizer;
pub mod packaging;
pub mod selection;
pub mod staging;
pub mod tools;
pub mod traits;
pub mod utils;

pub use backends::YtDlpBackend;
pub use classifier::{classify, Classified};
pub use errors::{ErrorView, PickerError};
pub use extractors::{
    BlockingReason, ExtractorConfig, ExtractorMode, InfoExtractor, InfoExtractorOrchestrator,
};
pub use models::{
    ChapterSections, DisplayItem, DownloadOptions, DownloadPlan, DownloadProgress, DownloadReport, ExtractionResult,
    Mode, NetworkConfig, SelectionSet, SelectorToken,
};
pub use normalizer::{normalize, parse_option, render_option};
pub use selection::plan_download;
pub use traits::{DownloaderBackend, NullProgress, ProgressSink};
