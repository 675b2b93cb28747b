// Staging directory handling for one download run

use std::io;
use std::path::{Path, PathBuf};

use super::models::AUDIO_CODEC;

/// Where the unsplit source audio goes in chapter mode.
pub const SOURCE_SUBDIR: &str = "_source";

/// Delete and recreate `dir` so a run starts from nothing.
pub fn reset(dir: &Path) -> io::Result<()> {
    remove(dir)?;
    std::fs::create_dir_all(dir)
}

/// Delete `dir` if it exists.
pub fn remove(dir: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Finished audio files of a run, sorted by file name.
///
/// Chapter files sit in the staging root; when there are none (splitting
/// failed or the video had no usable chapters) the unsplit source is reported.
pub fn collect_outputs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let top = audio_files_in(dir)?;
    if !top.is_empty() {
        return Ok(top);
    }

    let source = dir.join(SOURCE_SUBDIR);
    if source.is_dir() {
        return audio_files_in(&source);
    }
    Ok(Vec::new())
}

fn audio_files_in(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_finished_audio(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn is_finished_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(AUDIO_CODEC))
}
