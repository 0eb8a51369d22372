//! Active run reconciler.
//!
//! Detail fetches for the active run race with each other: poll ticks,
//! selections and post-accept refreshes can all be in flight at once and
//! resolve in any order. Each fetch takes a ticket when it is issued; on
//! resolution the ticket is checked against the session under the same lock
//! that guards the render, so a response renders only for the run that is
//! active at that moment and only if nothing newer has rendered.

use shared_types::{RunDetail, RunId};
use tracing::debug;

use crate::dashboard::Dashboard;
use crate::error::ClientResult;
use crate::session::{Admission, DetailTicket};
use crate::view::RunDetailView;

/// What happened to a resolved detail response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Rendered,
    Discarded(Admission),
}

impl DetailOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered)
    }
}

impl Dashboard {
    /// Fetch the detail for `run_id` and render it if it is still wanted
    pub async fn load_run(&self, run_id: &RunId) -> ClientResult<DetailOutcome> {
        let ticket = self.session().await.issue_detail_ticket(run_id);
        let detail = self.api().fetch_run_detail(run_id).await?;
        Ok(self.apply_run_detail(&ticket, &detail).await)
    }

    async fn apply_run_detail(&self, ticket: &DetailTicket, detail: &RunDetail) -> DetailOutcome {
        let mut session = self.session().await;
        match session.admit_detail(ticket) {
            Admission::Render => {
                let view = RunDetailView::from_detail(&ticket.run_id, detail);
                self.view().render_run_detail(&view);
                DetailOutcome::Rendered
            }
            admission => {
                debug!(
                    run_id = %ticket.run_id,
                    ticket = ticket.seq,
                    active = ?session.active_run_id(),
                    "discarding stale run detail"
                );
                DetailOutcome::Discarded(admission)
            }
        }
    }
}
