//! View models and the render seam
//!
//! Everything in this module except `DashboardView` implementations is a pure
//! transform from fetched data to what a renderer shows. Renderers only ever
//! receive fully built models and replace what they showed before.

mod memory;

pub use memory::{MemoryView, MemoryViewState};

use shared_types::{
    ChangeId, ChangeRecord, LogEntry, RunDetail, RunId, RunSummary, UploadResponse,
};

pub const AUTO_MODEL_LABEL: &str = "Auto-select in worker";
pub const NO_PROJECTS_LABEL: &str = "No projects found in mounted workspace";
pub const NO_FILES_SELECTED_LABEL: &str = "No files selected yet.";
pub const UPLOAD_NO_FILES_MESSAGE: &str = "Please choose one or more files to upload.";

/// Where inline status text is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusArea {
    Models,
    Projects,
    Runs,
    /// Run creation and the active run
    Run,
    Changes,
    Upload,
    SelectedFiles,
}

/// Render seam between the reconciliation core and whatever shows it
pub trait DashboardView: Send + Sync {
    fn render_models(&self, controls: &ModelControls);
    fn render_projects(&self, select: &SelectState);
    fn render_runs(&self, rows: &[RunRow]);
    fn render_run_detail(&self, detail: &RunDetailView);
    fn render_status(&self, area: StatusArea, message: &str);
}

// ============================================================================
// Select controls
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selectable: bool,
}

impl SelectOption {
    fn item(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
            selectable: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectState {
    pub options: Vec<SelectOption>,
    /// `None` is the empty selection: "auto" for models, the placeholder for
    /// projects
    pub selected: Option<String>,
}

impl SelectState {
    /// Values a user can pick, in rendered order
    pub fn values(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|option| option.selectable && !option.value.is_empty())
            .map(|option| option.value.as_str())
            .collect()
    }

    pub fn selected_value(&self) -> &str {
        self.selected.as_deref().unwrap_or("")
    }
}

/// Auto entry first, then every model; the previous choice survives only if
/// the new list still has it
pub fn model_select(models: &[String], previous: Option<&str>) -> SelectState {
    let mut options = Vec::with_capacity(models.len() + 1);
    options.push(SelectOption {
        value: String::new(),
        label: AUTO_MODEL_LABEL.to_string(),
        selectable: true,
    });
    options.extend(models.iter().map(|model| SelectOption::item(model)));

    let selected = previous
        .filter(|value| !value.is_empty() && models.iter().any(|m| m == value))
        .map(str::to_string);

    SelectState { options, selected }
}

/// An empty list renders a single non-selectable placeholder. Otherwise the
/// preferred value wins when present, then the previous selection, then the
/// first project.
pub fn project_select(
    projects: &[String],
    preferred: Option<&str>,
    previous: Option<&str>,
) -> SelectState {
    if projects.is_empty() {
        return SelectState {
            options: vec![SelectOption {
                value: String::new(),
                label: NO_PROJECTS_LABEL.to_string(),
                selectable: false,
            }],
            selected: None,
        };
    }

    let contains = |value: &&str| projects.iter().any(|p| p == value);
    let selected = preferred
        .filter(contains)
        .or_else(|| previous.filter(contains))
        .map(str::to_string)
        .or_else(|| projects.first().cloned());

    SelectState {
        options: projects.iter().map(|p| SelectOption::item(p)).collect(),
        selected,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelControls {
    pub fast: SelectState,
    pub deep: SelectState,
    pub status: String,
}

pub fn model_status_text(count: usize) -> String {
    if count > 0 {
        format!("{count} models detected and available in the dropdowns.")
    } else {
        "No models detected; worker auto-selection will be used.".to_string()
    }
}

// ============================================================================
// Runs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRow {
    pub id: RunId,
    pub label: String,
    pub project_path: String,
    pub active: bool,
}

/// Rows in server order
pub fn run_rows(runs: &[RunSummary], active: Option<&RunId>) -> Vec<RunRow> {
    runs.iter()
        .map(|run| RunRow {
            id: run.id.clone(),
            label: format!("#{} {}", run.id, run.status),
            project_path: run.project_path.clone(),
            active: active == Some(&run.id),
        })
        .collect()
}

pub fn format_log_line(entry: &LogEntry) -> String {
    format!(
        "[{}] {}: {}",
        entry.created_at,
        entry.kind.to_uppercase(),
        entry.message
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeCard {
    pub id: ChangeId,
    pub file_path: String,
    pub diff: String,
    pub accepted: bool,
}

impl ChangeCard {
    pub fn action_label(&self) -> &'static str {
        if self.accepted {
            "Accepted"
        } else {
            "Accept"
        }
    }
}

impl From<&ChangeRecord> for ChangeCard {
    fn from(record: &ChangeRecord) -> Self {
        Self {
            id: record.id.clone(),
            file_path: record.file_path.clone(),
            diff: record.diff.clone(),
            accepted: record.accepted,
        }
    }
}

/// Everything shown for the active run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDetailView {
    pub run_id: RunId,
    pub status: Option<String>,
    pub log_lines: Vec<String>,
    pub changes: Vec<ChangeCard>,
}

impl RunDetailView {
    pub fn from_detail(run_id: &RunId, detail: &RunDetail) -> Self {
        Self {
            run_id: run_id.clone(),
            status: detail.run.as_ref().map(|run| run.status.clone()),
            log_lines: detail.logs.iter().map(format_log_line).collect(),
            changes: detail.changes.iter().map(ChangeCard::from).collect(),
        }
    }

    pub fn log_text(&self) -> String {
        self.log_lines.join("\n")
    }

    pub fn change(&self, change_id: &ChangeId) -> Option<&ChangeCard> {
        self.changes.iter().find(|card| &card.id == change_id)
    }
}

// ============================================================================
// Uploads
// ============================================================================

pub fn selected_files_label(names: &[String]) -> String {
    if names.is_empty() {
        NO_FILES_SELECTED_LABEL.to_string()
    } else {
        format!("Selected ({}): {}", names.len(), names.join(", "))
    }
}

pub fn upload_progress_text(file_count: usize) -> String {
    format!("Uploading {file_count} file(s)...")
}

pub fn upload_success_text(response: &UploadResponse) -> String {
    match response {
        UploadResponse::Batch {
            count, total_size, ..
        } => format!("Uploaded {count} file(s) ({total_size} bytes total)."),
        UploadResponse::Single { filename, size, .. } => {
            format!("Uploaded {filename} ({size} bytes).")
        }
    }
}
