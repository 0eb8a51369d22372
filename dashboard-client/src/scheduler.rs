//! Poll scheduler.
//!
//! Ticks fire on a fixed period and each one runs as its own task, so a tick
//! stuck on a slow request never holds back the next. Overlapping ticks are
//! safe because detail renders go through the reconciler's staleness check.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::dashboard::Dashboard;
use crate::reconciler::DetailOutcome;

/// Result of one poll tick
#[derive(Debug, Default)]
pub struct TickReport {
    pub runs_refreshed: bool,
    /// `None` when no run was active or its fetch failed
    pub detail: Option<DetailOutcome>,
}

impl Dashboard {
    /// One poll tick: refresh the run list, then the active run if there is
    /// one. Failures are logged; the next tick simply tries again.
    pub async fn poll_once(&self) -> TickReport {
        let mut report = TickReport::default();

        match self.load_runs().await {
            Ok(_) => report.runs_refreshed = true,
            Err(e) => warn!("poll: run list refresh failed: {e}"),
        }

        if let Some(run_id) = self.active_run_id().await {
            match self.load_run(&run_id).await {
                Ok(outcome) => report.detail = Some(outcome),
                Err(e) => warn!(run_id = %run_id, "poll: run detail refresh failed: {e}"),
            }
        }

        report
    }
}

pub struct PollScheduler;

impl PollScheduler {
    /// Start polling every `period` until the returned handle is stopped.
    /// The first tick fires one period from now.
    pub fn spawn(dashboard: Dashboard, period: Duration) -> PollHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await; // first tick is immediate; skip it

            let mut tick: u64 = 0;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        tick += 1;
                        debug!(tick, "poll tick");
                        let dashboard = dashboard.clone();
                        tokio::spawn(async move {
                            dashboard.poll_once().await;
                        });
                    }
                }
            }
            debug!(ticks = tick, "poll scheduler stopped");
        });

        PollHandle { cancel, task }
    }
}

/// Stop hook for a running scheduler. In-flight ticks finish on their own.
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop and wait for the timer loop to exit
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            warn!("poll scheduler task ended abnormally: {e}");
        }
    }
}
