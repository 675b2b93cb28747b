// Session state and the analyze / download / reset actions
//
// Every action takes the state by value and hands it back inside a
// `Transition`, so the caller always holds exactly one current state.

use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::downloader::classifier::classify;
use crate::downloader::errors::PickerError;
use crate::downloader::extractors::InfoExtractor;
use crate::downloader::models::{DisplayItem, DownloadPlan, DownloadReport, ExtractionResult, Mode};
use crate::downloader::normalizer::{normalize, render_option};
use crate::downloader::selection::plan_download;
use crate::downloader::staging;
use crate::downloader::traits::{DownloaderBackend, ProgressSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Analyzing,
    Analyzed,
    Downloading,
    Delivered,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub id: Uuid,
    pub phase: Phase,
    pub url: Option<String>,
    /// Set together with `items`, never one without the other
    pub mode: Option<Mode>,
    pub items: Vec<DisplayItem>,
    pub raw: Option<ExtractionResult>,
    pub last_report: Option<DownloadReport>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            phase: Phase::Idle,
            url: None,
            mode: None,
            items: Vec::new(),
            raw: None,
            last_report: None,
        }
    }

    /// This session's private staging directory under `root`
    pub fn staging_dir(&self, root: &Path) -> PathBuf {
        root.join(self.id.to_string())
    }

    /// Copy published to readers while an action runs on the owned state.
    /// A download in flight has already discarded the previous report.
    pub fn in_flight(&self, phase: Phase) -> Self {
        let mut view = self.clone();
        view.phase = phase;
        if phase == Phase::Downloading {
            view.last_report = None;
        }
        view
    }

    fn clear_analysis(&mut self) {
        self.mode = None;
        self.items.clear();
        self.raw = None;
        self.last_report = None;
    }
}

/// New state plus the outcome of the action that produced it
#[derive(Debug)]
pub struct Transition<T> {
    pub state: SessionState,
    pub outcome: Result<T, PickerError>,
}

impl<T> Transition<T> {
    fn new(state: SessionState, outcome: Result<T, PickerError>) -> Self {
        Self { state, outcome }
    }

    /// Split into state and result
    pub fn into_parts(self) -> (SessionState, Result<T, PickerError>) {
        (self.state, self.outcome)
    }
}

/// What the UI shows after a successful analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisView {
    pub mode: Mode,
    pub title: Option<String>,
    pub items: Vec<DisplayItem>,
    /// `"NN. <title>"` labels, one per item, in order
    pub options: Vec<String>,
}

impl AnalysisView {
    fn new(mode: Mode, raw: &ExtractionResult, items: &[DisplayItem]) -> Self {
        Self {
            mode,
            title: raw.title().map(str::to_string),
            items: items.to_vec(),
            options: items.iter().map(render_option).collect(),
        }
    }
}

/// Arguments of the download action
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct DownloadRequest {
    /// Chosen option labels; empty means everything
    #[serde(default)]
    pub chosen: Vec<String>,
    /// Overrides `AppConfig::add_number` for this run
    #[serde(default)]
    pub add_number: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub phase: Phase,
    pub mode: Option<Mode>,
    pub item_count: usize,
    pub url: Option<String>,
    pub raw_excerpt: Option<String>,
}

/// Extract, classify and normalize `url`, replacing any previous analysis.
pub async fn analyze(
    mut state: SessionState,
    extractor: &dyn InfoExtractor,
    config: &AppConfig,
    url: &str,
) -> Transition<AnalysisView> {
    let url = url.trim();
    if url.is_empty() {
        return Transition::new(state, Err(PickerError::InputMissing));
    }

    tracing::info!("[session {}] analyzing {}", state.id, url);
    state.phase = Phase::Analyzing;
    state.url = Some(url.to_string());

    let raw = match extractor.extract(url, &config.extractor_config()).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("[session {}] extraction failed: {}", state.id, e);
            state.clear_analysis();
            state.phase = Phase::Failed;
            return Transition::new(state, Err(e));
        }
    };

    let Some(classified) = classify(Some(&raw)) else {
        state.clear_analysis();
        state.phase = Phase::Failed;
        return Transition::new(state, Err(PickerError::extraction("")));
    };

    let mode = classified.mode();
    let items = normalize(&classified);
    if items.is_empty() {
        tracing::warn!("[session {}] {} result had no items", state.id, mode);
        state.clear_analysis();
        state.raw = Some(raw);
        state.phase = Phase::Failed;
        return Transition::new(state, Err(PickerError::NoItemsFound));
    }

    tracing::info!("[session {}] {} with {} item(s)", state.id, mode, items.len());
    let view = AnalysisView::new(mode, &raw, &items);
    state.clear_analysis();
    state.mode = Some(mode);
    state.items = items;
    state.raw = Some(raw);
    state.phase = Phase::Analyzed;
    Transition::new(state, Ok(view))
}

/// Download the chosen items of the current analysis into a fresh staging dir.
pub async fn download(
    mut state: SessionState,
    backend: &dyn DownloaderBackend,
    config: &AppConfig,
    request: &DownloadRequest,
    progress: &dyn ProgressSink,
) -> Transition<DownloadReport> {
    let (Some(mode), Some(raw), Some(url)) = (state.mode, state.raw.as_ref(), state.url.as_deref()) else {
        return Transition::new(state, Err(PickerError::NotAnalyzed));
    };
    if state.items.is_empty() {
        return Transition::new(state, Err(PickerError::NotAnalyzed));
    }

    let add_number = request.add_number.unwrap_or(config.add_number);
    let plan = match plan_download(url, raw, mode, &state.items, &request.chosen, add_number) {
        Ok(plan) => plan,
        Err(e) => return Transition::new(state, Err(e)),
    };

    let staging_dir = state.staging_dir(&config.staging_root);
    tracing::info!(
        "[session {}] downloading {} via {} into {}",
        state.id,
        plan.selection.to_csv(),
        backend.name(),
        staging_dir.display()
    );
    state.phase = Phase::Downloading;
    state.last_report = None;

    let outcome = run_download(backend, config, &plan, staging_dir, progress).await;
    state.phase = match &outcome {
        Ok(_) => Phase::Delivered,
        Err(_) => Phase::Failed,
    };
    if let Ok(report) = &outcome {
        state.last_report = Some(report.clone());
    }
    Transition::new(state, outcome)
}

async fn run_download(
    backend: &dyn DownloaderBackend,
    config: &AppConfig,
    plan: &DownloadPlan,
    staging_dir: PathBuf,
    progress: &dyn ProgressSink,
) -> Result<DownloadReport, PickerError> {
    staging::reset(&staging_dir)?;
    let options = config.download_options(staging_dir.clone());
    backend.download(plan, &options, progress).await?;

    let files = staging::collect_outputs(&staging_dir)?;
    if files.is_empty() {
        tracing::warn!("[download] nothing produced in {}", staging_dir.display());
        return Err(PickerError::DownloadProducedNothing);
    }

    tracing::info!("[download] {} file(s) ready", files.len());
    Ok(DownloadReport {
        mode: plan.mode,
        staging_dir,
        files,
    })
}

/// Forget everything about the current session; the id is kept.
pub fn reset(state: SessionState) -> SessionState {
    tracing::info!("[session {}] reset", state.id);
    SessionState::with_id(state.id)
}

pub fn diagnostics(state: &SessionState, excerpt_chars: usize) -> Diagnostics {
    Diagnostics {
        phase: state.phase,
        mode: state.mode,
        item_count: state.items.len(),
        url: state.url.clone(),
        raw_excerpt: state.raw.as_ref().map(|raw| raw.excerpt(excerpt_chars)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_session_is_idle_and_empty() {
        let state = SessionState::new();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.mode.is_none());
        assert!(state.items.is_empty());
    }

    #[test]
    fn staging_dir_is_per_session() {
        let a = SessionState::new();
        let b = SessionState::new();
        let root = Path::new("/tmp/root");
        assert_ne!(a.staging_dir(root), b.staging_dir(root));
        assert!(a.staging_dir(root).starts_with(root));
    }

    #[test]
    fn reset_keeps_id_only() {
        let mut state = SessionState::new();
        let id = state.id;
        state.phase = Phase::Analyzed;
        state.mode = Some(Mode::Single);
        state.url = Some("u".to_string());
        state.raw = Some(ExtractionResult::new(json!({"title": "x"})));

        let state = reset(state);
        assert_eq!(state, SessionState::with_id(id));
    }

    #[test]
    fn in_flight_copy_keeps_identity() {
        let mut state = SessionState::new();
        state.phase = Phase::Delivered;
        state.mode = Some(Mode::Playlist);
        state.last_report = Some(DownloadReport {
            mode: Mode::Playlist,
            staging_dir: PathBuf::from("/tmp/stage"),
            files: vec![PathBuf::from("/tmp/stage/01. A.mp3")],
        });

        let analyzing = state.in_flight(Phase::Analyzing);
        assert_eq!(analyzing.id, state.id);
        assert_eq!(analyzing.phase, Phase::Analyzing);
        assert_eq!(analyzing.last_report, state.last_report);

        let downloading = state.in_flight(Phase::Downloading);
        assert_eq!(downloading.id, state.id);
        assert_eq!(downloading.mode, Some(Mode::Playlist));
        assert_eq!(downloading.last_report, None);
        assert_eq!(diagnostics(&downloading, 10).phase, Phase::Downloading);
    }

    #[test]
    fn diagnostics_truncate_raw() {
        let mut state = SessionState::new();
        state.raw = Some(ExtractionResult::new(json!({"title": "x".repeat(500)})));
        let snapshot = diagnostics(&state, 100);
        let excerpt = snapshot.raw_excerpt.unwrap();
        assert!(excerpt.starts_with('{'));
        assert!(excerpt.contains("more characters"));
        assert_eq!(snapshot.item_count, 0);
        assert_eq!(snapshot.phase, Phase::Idle);
    }
}
