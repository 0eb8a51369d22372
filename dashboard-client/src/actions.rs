//! User-triggered mutations: accept a change, create a run, upload files.
//!
//! Each mutation is followed by an authoritative re-fetch of whatever it
//! changed; response bodies are only used for the summary line.

use shared_types::{ChangeId, RunId, UploadResponse};
use tracing::{info, warn};

use crate::api::UploadFile;
use crate::dashboard::Dashboard;
use crate::error::{ClientError, ClientResult};
use crate::reconciler::DetailOutcome;
use crate::view::{
    selected_files_label, upload_progress_text, upload_success_text, StatusArea,
    UPLOAD_NO_FILES_MESSAGE,
};

impl Dashboard {
    /// Accept one change of `run_id`, then re-fetch the run.
    ///
    /// The accepted flag is never flipped locally; it changes on screen only
    /// when the re-fetch renders server state. The re-fetch is issued even if
    /// the mutation failed.
    pub async fn accept_change(
        &self,
        run_id: &RunId,
        change_id: &ChangeId,
    ) -> ClientResult<DetailOutcome> {
        info!(run_id = %run_id, change_id = %change_id, "accepting change");
        let accepted = self.api().accept_change(change_id).await;
        if let Err(e) = &accepted {
            warn!(change_id = %change_id, "accept failed: {e}");
            self.view().render_status(
                StatusArea::Changes,
                &format!("Accept failed: {}", e.user_message()),
            );
        }

        let refreshed = self.load_run(run_id).await;
        accepted?;
        refreshed
    }

    /// Start a run from the current form and make it the active run
    pub async fn create_run(&self) -> ClientResult<RunId> {
        let request = self.session().await.form.create_request();
        info!(
            project = %request.project_path,
            fast_model = ?request.fast_model,
            deep_model = ?request.deep_model,
            "creating run"
        );

        let created = match self.api().create_run(&request).await {
            Ok(created) => created,
            Err(e) => {
                warn!("create run failed: {e}");
                self.view().render_status(
                    StatusArea::Run,
                    &format!("Failed to start run: {}", e.user_message()),
                );
                return Err(e);
            }
        };

        self.session().await.set_active_run(created.id.clone());
        let status = created.status.as_deref().unwrap_or("created");
        self.view()
            .render_status(StatusArea::Run, &format!("Run #{} {status}", created.id));

        if let Err(e) = self.load_runs().await {
            warn!(run_id = %created.id, "run list refresh after create failed: {e}");
        }
        Ok(created.id)
    }

    /// Upload the files chosen in the form; the selection is cleared on
    /// success
    pub async fn upload_selected_files(&self) -> ClientResult<UploadResponse> {
        let (files, project_name) = {
            let session = self.session().await;
            (
                session.form.selected_files.clone(),
                session.form.upload_project_name().map(str::to_string),
            )
        };

        let response = self.upload_files(files, project_name.as_deref()).await?;

        let mut session = self.session().await;
        session.form.selected_files.clear();
        self.view()
            .render_status(StatusArea::SelectedFiles, &selected_files_label(&[]));
        Ok(response)
    }

    /// Upload `files` into `project_name` (or a server-chosen project) and
    /// refresh the project list with the target pre-selected
    pub async fn upload_files(
        &self,
        files: Vec<UploadFile>,
        project_name: Option<&str>,
    ) -> ClientResult<UploadResponse> {
        if files.is_empty() {
            self.view()
                .render_status(StatusArea::Upload, UPLOAD_NO_FILES_MESSAGE);
            return Err(ClientError::Validation(UPLOAD_NO_FILES_MESSAGE.to_string()));
        }

        let total_bytes: usize = files.iter().map(UploadFile::len).sum();
        info!(files = files.len(), bytes = total_bytes, project = ?project_name, "uploading files");
        self.view()
            .render_status(StatusArea::Upload, &upload_progress_text(files.len()));

        let response = match self.api().upload_code(&files, project_name).await {
            Ok(response) => response,
            Err(e) => {
                warn!("upload failed: {e}");
                self.view().render_status(
                    StatusArea::Upload,
                    &format!("Upload failed: {}", e.user_message()),
                );
                return Err(e);
            }
        };

        info!(
            project = %response.project_path(),
            files = response.file_count(),
            bytes = response.total_bytes(),
            "upload complete"
        );
        self.view()
            .render_status(StatusArea::Upload, &upload_success_text(&response));
        if let Err(e) = self.load_projects(Some(response.project_path())).await {
            warn!(project = %response.project_path(), "project refresh after upload failed: {e}");
        }
        Ok(response)
    }
}
