// InfoExtractor module - flat metadata extraction through yt-dlp
//
// Provides two launchers:
// - CLI mode: native `yt-dlp` binary
// - Python mode: `python3 -m yt_dlp`
//
// The orchestrator picks one (or tries both in Auto mode).

mod cli;
mod diagnostics;
mod orchestrator;
mod python;
mod traits;

pub use cli::CliInfoExtractor;
pub use diagnostics::{diagnose_error, BlockingReason};
pub use orchestrator::InfoExtractorOrchestrator;
pub use python::PythonInfoExtractor;
pub use traits::{extraction_args, parse_extraction, ExtractorConfig, ExtractorMode, InfoExtractor};
