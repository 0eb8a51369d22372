//! Run registry: the list of known runs

use shared_types::RunId;
use tracing::{debug, info, warn};

use crate::dashboard::Dashboard;
use crate::error::ClientResult;
use crate::reconciler::DetailOutcome;
use crate::view::{run_rows, StatusArea};

impl Dashboard {
    /// Fetch every run and re-render the list in server order.
    ///
    /// Returns the ids that appeared since the previous load. A response
    /// that resolves after a later-issued one is dropped. Never touches the
    /// active run id.
    pub async fn load_runs(&self) -> ClientResult<Vec<RunId>> {
        let ticket = self.session().await.issue_runs_ticket();
        let data = self.api().fetch_runs().await?;

        let mut session = self.session().await;
        if !session.admit_runs(ticket) {
            debug!(ticket, "discarding stale run list");
            return Ok(Vec::new());
        }
        let appeared = session.record_runs(data.runs);
        for run_id in &appeared {
            info!(run_id = %run_id, "new run appeared");
        }

        let rows = run_rows(session.runs(), session.active_run_id());
        self.view().render_runs(&rows);
        Ok(appeared)
    }

    /// Make `run_id` the active run and fetch exactly its detail
    pub async fn select_run(&self, run_id: RunId) -> ClientResult<DetailOutcome> {
        {
            let mut session = self.session().await;
            session.set_active_run(run_id.clone());
            let rows = run_rows(session.runs(), session.active_run_id());
            self.view().render_runs(&rows);
        }
        info!(run_id = %run_id, "run selected");

        match self.load_run(&run_id).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(run_id = %run_id, "failed to load selected run: {e}");
                if self.active_run_id().await.as_ref() == Some(&run_id) {
                    self.view().render_status(
                        StatusArea::Run,
                        &format!("Failed to load run #{run_id}: {}", e.user_message()),
                    );
                }
                Err(e)
            }
        }
    }
}
