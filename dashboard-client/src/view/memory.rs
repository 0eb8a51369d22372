use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use shared_types::RunId;

use super::{DashboardView, ModelControls, RunDetailView, RunRow, SelectState, StatusArea};

/// Everything a `MemoryView` has been asked to show
#[derive(Debug, Clone, Default)]
pub struct MemoryViewState {
    pub models: Option<ModelControls>,
    pub projects: Option<SelectState>,
    pub runs: Vec<RunRow>,
    pub run_detail: Option<RunDetailView>,
    /// Run id of every detail render, in order
    pub detail_renders: Vec<RunId>,
    pub statuses: HashMap<StatusArea, String>,
}

impl MemoryViewState {
    pub fn status(&self, area: StatusArea) -> Option<&str> {
        self.statuses.get(&area).map(String::as_str)
    }
}

/// Headless renderer that keeps the latest model of every area
#[derive(Debug, Default)]
pub struct MemoryView {
    state: Mutex<MemoryViewState>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MemoryViewState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DashboardView for MemoryView {
    fn render_models(&self, controls: &ModelControls) {
        self.lock().models = Some(controls.clone());
    }

    fn render_projects(&self, select: &SelectState) {
        self.lock().projects = Some(select.clone());
    }

    fn render_runs(&self, rows: &[RunRow]) {
        self.lock().runs = rows.to_vec();
    }

    fn render_run_detail(&self, detail: &RunDetailView) {
        let mut state = self.lock();
        state.detail_renders.push(detail.run_id.clone());
        state.run_detail = Some(detail.clone());
    }

    fn render_status(&self, area: StatusArea, message: &str) {
        self.lock().statuses.insert(area, message.to_string());
    }
}
