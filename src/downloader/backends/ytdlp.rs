use async_trait::async_trait;
use regex::Regex;

use crate::downloader::errors::PickerError;
use crate::downloader::extractors::diagnose_error;
use crate::downloader::models::{
    ChapterSections, DownloadOptions, DownloadPlan, DownloadProgress, Mode, SelectorToken, AUDIO_CODEC,
    AUDIO_QUALITY,
};
use crate::downloader::staging::SOURCE_SUBDIR;
use crate::downloader::tools::Launcher;
use crate::downloader::traits::{DownloaderBackend, ProgressSink};
use crate::downloader::utils::{network_args, run_streaming_with_timeout, ProcessError};

/// Audio-only batch download through yt-dlp (binary or Python module)
pub struct YtDlpBackend {
    launcher: Launcher,
}

impl YtDlpBackend {
    pub fn new(launcher: Launcher) -> Self {
        Self { launcher }
    }

    /// Build the yt-dlp argument list for a plan
    pub fn build_args(plan: &DownloadPlan, options: &DownloadOptions) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            "bestaudio/best".to_string(),
            "-x".to_string(),
            "--audio-format".to_string(),
            AUDIO_CODEC.to_string(),
            "--audio-quality".to_string(),
            AUDIO_QUALITY.to_string(),
            "--ignore-errors".to_string(),
            "--no-warnings".to_string(),
            "--newline".to_string(),
            "--no-colors".to_string(),
            "-P".to_string(),
            options.staging_dir.to_string_lossy().to_string(),
        ];

        match (&plan.mode, &plan.selector) {
            (Mode::Playlist, SelectorToken::PlaylistItems(items)) => {
                args.extend([
                    "--yes-playlist".to_string(),
                    "--playlist-items".to_string(),
                    items.clone(),
                    "-o".to_string(),
                    plan.output_template.clone(),
                ]);
            }
            (Mode::Chapters, SelectorToken::ChapterPattern(pattern)) => {
                args.push("--no-playlist".to_string());
                match plan.chapters.as_ref().unwrap_or(&ChapterSections::IndexPattern) {
                    // Whole video, split afterwards; the unsplit source lands in a subdirectory.
                    ChapterSections::SplitAll => {
                        args.extend([
                            "--split-chapters".to_string(),
                            "-o".to_string(),
                            format!("{}/%(title)s.%(ext)s", SOURCE_SUBDIR),
                            "-o".to_string(),
                            format!("chapter:{}", plan.output_template),
                        ]);
                    }
                    ChapterSections::Titles(titles) => {
                        args.extend(section_args([titles.clone()], &plan.output_template));
                    }
                    ChapterSections::Ranges(ranges) => {
                        let sections = ranges.iter().map(|r| format!("*{}-{}", r.start, r.end));
                        args.extend(section_args(sections, &plan.output_template));
                    }
                    ChapterSections::IndexPattern => {
                        args.extend(section_args([pattern.clone()], &plan.output_template));
                    }
                }
            }
            _ => {
                args.extend([
                    "--no-playlist".to_string(),
                    "-o".to_string(),
                    plan.output_template.clone(),
                ]);
            }
        }

        args.extend(network_args(&options.network));
        args.push("--".to_string());
        args.push(plan.url.clone());
        args
    }
}

/// `--download-sections` for each section, then one output template for all of them
fn section_args(sections: impl IntoIterator<Item = String>, template: &str) -> Vec<String> {
    let mut args: Vec<String> = sections
        .into_iter()
        .flat_map(|s| ["--download-sections".to_string(), s])
        .collect();
    args.extend(["-o".to_string(), template.to_string()]);
    args
}

#[async_trait]
impl DownloaderBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn download(
        &self,
        plan: &DownloadPlan,
        options: &DownloadOptions,
        progress: &dyn ProgressSink,
    ) -> Result<(), PickerError> {
        let args = self.launcher.args(Self::build_args(plan, options));
        tracing::info!(
            "[download] {} {} item(s) from {}",
            plan.mode,
            plan.selection.len(),
            plan.url
        );
        tracing::debug!("[download] {} {}", self.launcher.program(), args.join(" "));

        let run = run_streaming_with_timeout(
            self.launcher.program(),
            args,
            options.timeout_seconds,
            |line| {
                if let Some((percent, status)) = parse_ytdlp_progress(line) {
                    progress.emit(DownloadProgress { percent, status });
                }
                tracing::debug!("[yt-dlp] {}", line);
            },
        )
        .await
        .map_err(|e| match e {
            ProcessError::Spawn { program, .. } => PickerError::ToolNotFound(program),
            other => PickerError::DownloadRaised(other.to_string()),
        })?;

        if run.success {
            progress.emit(DownloadProgress {
                percent: 100.0,
                status: "✅ Done".to_string(),
            });
        } else {
            // --ignore-errors: skipped items make the exit code non-zero.
            // Whether anything was produced is decided from the staging dir.
            let reason = diagnose_error(&run.stderr);
            tracing::warn!(
                "[download] yt-dlp reported errors ({:?}): {}",
                reason,
                run.stderr.lines().last().unwrap_or_default()
            );
        }

        Ok(())
    }
}

/// Parse yt-dlp progress line like:
/// [download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32
/// Returns (percent, status_string)
pub fn parse_ytdlp_progress(line: &str) -> Option<(f32, String)> {
    lazy_static::lazy_static! {
        static ref PROGRESS_RE: Regex = Regex::new(
            r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\S+))?(?:\s+ETA\s+(\S+))?"
        ).unwrap();
        static ref ITEM_RE: Regex = Regex::new(r"\[download\]\s+Downloading item (\d+) of (\d+)").unwrap();
        static ref EXTRACT_RE: Regex = Regex::new(r"\[ExtractAudio\]\s+Destination:\s+(.+)").unwrap();
        static ref SPLIT_RE: Regex = Regex::new(r"\[SplitChapters\]\s+(?:Splitting|Chapter)").unwrap();
        static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
    }

    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let size = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
        let status = match (caps.get(3), caps.get(4)) {
            (Some(speed), Some(eta)) => format!("⬇️ {:.1}% of {} @ {} ETA {}", percent, size, speed.as_str(), eta.as_str()),
            (Some(speed), None) => format!("⬇️ {:.1}% of {} @ {}", percent, size, speed.as_str()),
            _ => format!("⬇️ {:.1}% of {}", percent, size),
        };
        return Some((percent, status));
    }

    if let Some(caps) = ITEM_RE.captures(line) {
        let current = caps.get(1).map(|m| m.as_str()).unwrap_or("?");
        let total = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
        return Some((0.0, format!("📥 Item {} of {}", current, total)));
    }

    if let Some(caps) = EXTRACT_RE.captures(line) {
        let path = caps.get(1).map(|m| m.as_str()).unwrap_or("file");
        let short_name: String = path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(path)
            .chars()
            .take(50)
            .collect();
        return Some((99.0, format!("🎵 Converting: {}", short_name)));
    }

    if SPLIT_RE.is_match(line) {
        return Some((99.0, "✂️ Splitting chapters...".to_string()));
    }

    if ALREADY_RE.is_match(line) {
        return Some((100.0, "✅ File already downloaded".to_string()));
    }

    None
}
