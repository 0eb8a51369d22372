//! Directory cache: available models and projects.
//!
//! Both loads replace every rendered option; nothing is patched in place.

use tracing::{debug, warn};

use crate::dashboard::Dashboard;
use crate::error::ClientResult;
use crate::view::{model_select, model_status_text, project_select, ModelControls, StatusArea};

impl Dashboard {
    /// Fetch the model list and republish it to the fast and deep controls.
    /// A control keeps its choice only if the new list still contains it.
    pub async fn load_models(&self) -> ClientResult<()> {
        let models = match self.api().fetch_models().await {
            Ok(models) => models,
            Err(e) => {
                warn!("failed to load models: {e}");
                self.view().render_status(
                    StatusArea::Models,
                    &format!("Failed to load models: {}", e.user_message()),
                );
                return Err(e);
            }
        };
        debug!(count = models.len(), "models loaded");

        let mut session = self.session().await;
        let fast = model_select(&models, session.form.fast_model.as_deref());
        let deep = model_select(&models, session.form.deep_model.as_deref());
        session.form.fast_model = fast.selected.clone();
        session.form.deep_model = deep.selected.clone();

        let controls = ModelControls {
            fast,
            deep,
            status: model_status_text(models.len()),
        };
        session.set_models(models);
        self.view().render_models(&controls);
        Ok(())
    }

    /// Fetch the project list; `preferred` becomes the selection when the
    /// server returned it
    pub async fn load_projects(&self, preferred: Option<&str>) -> ClientResult<()> {
        let projects = match self.api().fetch_projects().await {
            Ok(projects) => projects,
            Err(e) => {
                warn!("failed to load projects: {e}");
                self.view().render_status(
                    StatusArea::Projects,
                    &format!("Failed to load projects: {}", e.user_message()),
                );
                return Err(e);
            }
        };
        debug!(count = projects.len(), preferred = ?preferred, "projects loaded");

        let mut session = self.session().await;
        session.set_projects(projects);
        let select = project_select(
            session.projects(),
            preferred,
            session.form.project.as_deref(),
        );
        session.form.project = select.selected.clone();
        self.view().render_projects(&select);
        Ok(())
    }
}
