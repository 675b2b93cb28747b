// Delivery: copy single files out of staging, or bundle the run as a ZIP

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::errors::PickerError;
use super::models::DownloadReport;

/// Default archive name for a run
pub fn archive_name(report: &DownloadReport) -> String {
    format!("youtube_mp3_{}.zip", report.mode)
}

fn reported_file<'a>(report: &'a DownloadReport, name: &str) -> Result<&'a PathBuf, PickerError> {
    report
        .files
        .iter()
        .find(|p| p.file_name().is_some_and(|n| n.to_string_lossy() == name))
        .ok_or_else(|| PickerError::UnknownFile(name.to_string()))
}

/// Copy one reported file into `dest_dir`; returns the written path.
pub fn export_file(report: &DownloadReport, name: &str, dest_dir: &Path) -> Result<PathBuf, PickerError> {
    let source = reported_file(report, name)?;
    std::fs::create_dir_all(dest_dir)?;
    let dest = dest_dir.join(name);
    std::fs::copy(source, &dest)?;
    tracing::info!("[export] {} -> {}", name, dest.display());
    Ok(dest)
}

/// Write every reported file into a ZIP at `dest` (flat layout).
pub fn package_archive(report: &DownloadReport, dest: &Path) -> Result<PathBuf, PickerError> {
    if report.files.is_empty() {
        return Err(PickerError::DownloadProducedNothing);
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // MP3 barely compresses; deflate keeps the archive portable anyway
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    for path in &report.files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| PickerError::Archive(format!("no file name: {}", path.display())))?;
        zip.start_file(name.as_str(), options)?;
        let mut source = File::open(path)?;
        std::io::copy(&mut source, &mut zip)?;
    }
    let mut writer = zip.finish()?;
    writer.flush()?;

    tracing::info!("[archive] {} file(s) -> {}", report.files.len(), dest.display());
    Ok(dest.to_path_buf())
}
