use std::sync::Arc;

use shared_types::RunId;
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

use crate::api::{ApiClient, UploadFile};
use crate::session::SessionState;
use crate::view::{selected_files_label, DashboardView, StatusArea};

struct DashboardInner {
    api: ApiClient,
    session: Mutex<SessionState>,
    view: Arc<dyn DashboardView>,
}

/// Cheap-to-clone handle shared by user actions and poll ticks.
///
/// Component operations live next to their component: `directory`,
/// `registry`, `reconciler`, `actions` and `scheduler` each add an `impl`
/// block.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

impl Dashboard {
    pub fn new(api: ApiClient, view: Arc<dyn DashboardView>) -> Self {
        Self {
            inner: Arc::new(DashboardInner {
                api,
                session: Mutex::new(SessionState::new()),
                view,
            }),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn view(&self) -> &dyn DashboardView {
        self.inner.view.as_ref()
    }

    /// Locks the session. Never hold the guard across a request.
    pub async fn session(&self) -> MutexGuard<'_, SessionState> {
        self.inner.session.lock().await
    }

    pub async fn active_run_id(&self) -> Option<RunId> {
        self.session().await.active_run_id().cloned()
    }

    /// Initial page load: models, projects and runs in parallel. A failed
    /// load is logged and shown in its own status area; the others proceed.
    pub async fn bootstrap(&self) {
        let (models, projects, runs) =
            tokio::join!(self.load_models(), self.load_projects(None), self.load_runs());

        if let Err(e) = models {
            warn!("initial model load failed: {e}");
        }
        if let Err(e) = projects {
            warn!("initial project load failed: {e}");
        }
        if let Err(e) = runs {
            warn!("initial run load failed: {e}");
            self.view().render_status(
                StatusArea::Runs,
                &format!("Failed to load runs: {}", e.user_message()),
            );
        }
    }

    // ========================================================================
    // Form inputs
    // ========================================================================

    pub async fn select_project(&self, project: Option<String>) {
        self.session().await.form.project = project;
    }

    pub async fn set_prompt(&self, prompt: impl Into<String>) {
        self.session().await.form.prompt = prompt.into();
    }

    pub async fn select_fast_model(&self, model: Option<String>) {
        self.session().await.form.fast_model = model;
    }

    pub async fn select_deep_model(&self, model: Option<String>) {
        self.session().await.form.deep_model = model;
    }

    pub async fn set_upload_project_name(&self, name: impl Into<String>) {
        self.session().await.form.upload_project_name = name.into();
    }

    pub async fn select_files(&self, files: Vec<UploadFile>) {
        let mut session = self.session().await;
        session.form.selected_files = files;
        let label = selected_files_label(&session.form.selected_file_names());
        self.view().render_status(StatusArea::SelectedFiles, &label);
    }
}
