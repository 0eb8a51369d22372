//! Run-state reconciliation core of the run dashboard
//!
//! Keeps one observed "active run" consistent while a poll loop, user
//! mutations and run switches all race against each other. Fetch/merge logic
//! lives here; rendering goes through the `DashboardView` seam.

pub mod actions;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod reconciler;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod view;

pub use api::{ApiClient, RequestBody, RequestOptions, UploadFile};
pub use config::ClientConfig;
pub use dashboard::Dashboard;
pub use error::{ClientError, ClientResult};
pub use reconciler::DetailOutcome;
pub use scheduler::{PollHandle, PollScheduler, TickReport};
pub use session::{Admission, SessionState};
pub use view::{DashboardView, MemoryView, StatusArea};
