// Tauri command surface. One session per window; actions run one at a time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tauri::{Emitter, State, WebviewWindow};
use tauri_plugin_dialog::DialogExt;
use tauri_plugin_opener::OpenerExt;
use tokio::sync::{oneshot, Mutex};

use crate::config::AppConfig;
use crate::downloader::errors::{ErrorView, PickerError};
use crate::downloader::extractors::{ExtractorMode, InfoExtractor, InfoExtractorOrchestrator};
use crate::downloader::models::{DownloadProgress, DownloadReport};
use crate::downloader::packaging;
use crate::downloader::staging;
use crate::downloader::tools::{Launcher, ToolInfo, ToolManager};
use crate::downloader::traits::{DownloaderBackend, ProgressSink};
use crate::downloader::YtDlpBackend;
use crate::session::{self, AnalysisView, Diagnostics, DownloadRequest, Phase, SessionState};

pub struct AppState {
    config: AppConfig,
    extractor: Arc<dyn InfoExtractor>,
    backend: Arc<dyn DownloaderBackend>,
    sessions: Mutex<HashMap<String, SessionState>>,
    /// Held for the whole of an analyze or download
    run_lock: Mutex<()>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let extractor = Arc::new(InfoExtractorOrchestrator::new(
            config.ytdlp_path.clone(),
            config.python_cmd.clone(),
        ));
        let backend = Arc::new(YtDlpBackend::new(download_launcher(&config)));
        tracing::info!(
            "[app] extractor mode {}, staging under {}",
            config.extractor_mode,
            config.staging_root.display()
        );

        Self {
            config,
            extractor,
            backend,
            sessions: Mutex::new(HashMap::new()),
            run_lock: Mutex::new(()),
        }
    }

    /// Owned state for an action; readers see a copy in `phase` until it is put back.
    async fn begin(&self, label: &str, phase: Phase) -> SessionState {
        let mut sessions = self.sessions.lock().await;
        let current = sessions.get(label).cloned().unwrap_or_default();
        sessions.insert(label.to_string(), current.in_flight(phase));
        current
    }

    async fn put_session(&self, label: &str, state: SessionState) {
        self.sessions.lock().await.insert(label.to_string(), state);
    }

    async fn last_report(&self, label: &str) -> Result<DownloadReport, PickerError> {
        self.sessions
            .lock()
            .await
            .get(label)
            .and_then(|s| s.last_report.clone())
            .ok_or(PickerError::NoDownloadYet)
    }
}

/// Same launcher preference as extraction: binary unless Python is forced or the binary is missing.
fn download_launcher(config: &AppConfig) -> Launcher {
    let binary = Launcher::Binary(config.ytdlp_path.clone());
    let module = Launcher::PythonModule(config.python_cmd.clone());
    match config.extractor_mode {
        ExtractorMode::Python => module,
        ExtractorMode::Cli => binary,
        ExtractorMode::Auto if binary.is_available() || !module.is_available() => binary,
        ExtractorMode::Auto => module,
    }
}

/// Forwards yt-dlp progress to the window as `download-progress` events
struct WindowProgress(WebviewWindow);

impl ProgressSink for WindowProgress {
    fn emit(&self, progress: DownloadProgress) {
        let _ = self.0.emit("download-progress", progress);
    }
}

#[tauri::command]
pub async fn analyze_url(
    window: WebviewWindow,
    state: State<'_, AppState>,
    url: String,
) -> Result<AnalysisView, ErrorView> {
    let _run = state.run_lock.lock().await;
    let label = window.label().to_string();

    let current = state.begin(&label, Phase::Analyzing).await;
    let (next, outcome) = session::analyze(current, state.extractor.as_ref(), &state.config, &url)
        .await
        .into_parts();
    state.put_session(&label, next).await;

    outcome.map_err(ErrorView::from)
}

#[tauri::command]
pub async fn download_selection(
    window: WebviewWindow,
    state: State<'_, AppState>,
    request: DownloadRequest,
) -> Result<Vec<String>, ErrorView> {
    let _run = state.run_lock.lock().await;
    let label = window.label().to_string();
    let sink = WindowProgress(window.clone());

    let current = state.begin(&label, Phase::Downloading).await;
    let (next, outcome) = session::download(current, state.backend.as_ref(), &state.config, &request, &sink)
        .await
        .into_parts();
    state.put_session(&label, next).await;

    if let Err(e) = &outcome {
        sink.emit(DownloadProgress {
            percent: 0.0,
            status: format!("❌ {}", e),
        });
    }
    outcome.map(|report| report.file_names()).map_err(ErrorView::from)
}

/// Copy one produced file out. With `choose_folder` the user picks the destination.
#[tauri::command]
pub async fn export_file(
    window: WebviewWindow,
    state: State<'_, AppState>,
    name: String,
    choose_folder: bool,
) -> Result<Option<String>, ErrorView> {
    let report = state.last_report(window.label()).await?;

    let dest_dir = if choose_folder {
        match pick_folder(&window, &state.config.export_dir).await {
            Some(dir) => dir,
            None => return Ok(None),
        }
    } else {
        state.config.export_dir.clone()
    };

    let written = packaging::export_file(&report, &name, &dest_dir)?;
    Ok(Some(written.to_string_lossy().to_string()))
}

/// ZIP every produced file. With `choose_path` the user picks where to save it.
#[tauri::command]
pub async fn package_archive(
    window: WebviewWindow,
    state: State<'_, AppState>,
    choose_path: bool,
) -> Result<Option<String>, ErrorView> {
    let report = state.last_report(window.label()).await?;
    let name = packaging::archive_name(&report);

    let dest = if choose_path {
        match pick_archive_path(&window, &state.config.export_dir, &name).await {
            Some(path) => path,
            None => return Ok(None),
        }
    } else {
        state.config.export_dir.join(&name)
    };

    let written = packaging::package_archive(&report, &dest)?;
    Ok(Some(written.to_string_lossy().to_string()))
}

#[tauri::command]
pub async fn open_staging_dir(window: WebviewWindow, state: State<'_, AppState>) -> Result<(), ErrorView> {
    let report = state.last_report(window.label()).await?;
    window
        .opener()
        .open_path(report.staging_dir.to_string_lossy().to_string(), None::<&str>)
        .map_err(|e| ErrorView::from(PickerError::Io(std::io::Error::other(e.to_string()))))
}

#[tauri::command]
pub async fn get_diagnostics(window: WebviewWindow, state: State<'_, AppState>) -> Result<Diagnostics, ErrorView> {
    let sessions = state.sessions.lock().await;
    let snapshot = match sessions.get(window.label()) {
        Some(s) => session::diagnostics(s, state.config.diagnostics_excerpt_chars),
        None => session::diagnostics(&SessionState::new(), state.config.diagnostics_excerpt_chars),
    };
    Ok(snapshot)
}

#[tauri::command]
pub async fn reset_session(window: WebviewWindow, state: State<'_, AppState>) -> Result<(), ErrorView> {
    let _run = state.run_lock.lock().await;
    let label = window.label().to_string();

    let staging_dir = {
        let mut sessions = state.sessions.lock().await;
        let current = sessions.remove(&label).unwrap_or_default();
        let staging_dir = current.staging_dir(&state.config.staging_root);
        sessions.insert(label, session::reset(current));
        staging_dir
    };

    staging::remove(&staging_dir).map_err(PickerError::from)?;
    Ok(())
}

#[tauri::command]
pub async fn get_tools_status(state: State<'_, AppState>) -> Result<Vec<ToolInfo>, ErrorView> {
    let manager = ToolManager::new(state.config.ytdlp_path.clone(), state.config.python_cmd.clone());
    tokio::task::spawn_blocking(move || manager.get_all_tools())
        .await
        .map_err(|e| ErrorView::from(PickerError::Io(std::io::Error::other(e.to_string()))))
}

async fn pick_folder(window: &WebviewWindow, start: &Path) -> Option<PathBuf> {
    let (tx, rx) = oneshot::channel();
    window
        .dialog()
        .file()
        .set_directory(start)
        .pick_folder(move |folder| {
            let _ = tx.send(folder.and_then(|f| f.into_path().ok()));
        });
    rx.await.ok().flatten()
}

async fn pick_archive_path(window: &WebviewWindow, start: &Path, name: &str) -> Option<PathBuf> {
    let (tx, rx) = oneshot::channel();
    window
        .dialog()
        .file()
        .set_directory(start)
        .set_file_name(name)
        .add_filter("ZIP archive", &["zip"])
        .save_file(move |path| {
            let _ = tx.send(path.and_then(|p| p.into_path().ok()));
        });
    rx.await.ok().flatten()
}
