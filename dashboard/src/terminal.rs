//! Line-oriented renderer for the terminal.
//!
//! Every area remembers the text it last printed and stays quiet when a
//! render would print the same thing again, so a poll tick that changes
//! nothing leaves the terminal alone.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;
use dashboard_client::view::{ModelControls, RunDetailView, RunRow, SelectState};
use dashboard_client::{DashboardView, StatusArea};

#[derive(Debug, Default)]
pub struct TerminalView {
    printed: Mutex<HashMap<String, String>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn printed(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.printed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Print `text` under `key` unless it is what `key` showed last
    fn emit(&self, key: &str, text: String) {
        let mut printed = self.printed();
        if printed.get(key) == Some(&text) {
            return;
        }
        let stamp = Local::now().format("%H:%M:%S");
        let mut out = std::io::stdout().lock();
        // A closed stdout only loses output
        let _ = writeln!(out, "[{stamp}] {text}");
        let _ = out.flush();
        printed.insert(key.to_string(), text);
    }
}

fn area_name(area: StatusArea) -> &'static str {
    match area {
        StatusArea::Models => "models",
        StatusArea::Projects => "projects",
        StatusArea::Runs => "runs",
        StatusArea::Run => "run",
        StatusArea::Changes => "changes",
        StatusArea::Upload => "upload",
        StatusArea::SelectedFiles => "files",
    }
}

fn select_text(select: &SelectState) -> String {
    select
        .options
        .iter()
        .map(|option| {
            let marker = if option.selectable && select.selected_value() == option.value {
                "*"
            } else {
                " "
            };
            format!("  {marker} {}", option.label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn models_text(controls: &ModelControls) -> String {
    format!(
        "models: {}\n fast:\n{}\n deep:\n{}",
        controls.status,
        select_text(&controls.fast),
        select_text(&controls.deep)
    )
}

pub fn projects_text(select: &SelectState) -> String {
    format!("projects:\n{}", select_text(select))
}

pub fn runs_text(rows: &[RunRow]) -> String {
    if rows.is_empty() {
        return "runs: none yet".to_string();
    }
    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            let marker = if row.active { ">" } else { " " };
            format!("  {marker} {:<16} {}", row.label, row.project_path)
        })
        .collect();
    format!("runs:\n{}", lines.join("\n"))
}

pub fn detail_text(detail: &RunDetailView) -> String {
    let mut text = match &detail.status {
        Some(status) => format!("run #{} ({status})", detail.run_id),
        None => format!("run #{}", detail.run_id),
    };
    text.push_str("\n logs:");
    for line in &detail.log_lines {
        text.push_str("\n  ");
        text.push_str(line);
    }
    if !detail.changes.is_empty() {
        text.push_str("\n changes:");
    }
    for change in &detail.changes {
        text.push_str(&format!(
            "\n  [{}] #{} {}",
            change.action_label(),
            change.id,
            change.file_path
        ));
        for diff_line in change.diff.lines() {
            text.push_str("\n    ");
            text.push_str(diff_line);
        }
    }
    text
}

impl DashboardView for TerminalView {
    fn render_models(&self, controls: &ModelControls) {
        self.emit("models", models_text(controls));
    }

    fn render_projects(&self, select: &SelectState) {
        self.emit("projects", projects_text(select));
    }

    fn render_runs(&self, rows: &[RunRow]) {
        self.emit("runs", runs_text(rows));
    }

    fn render_run_detail(&self, detail: &RunDetailView) {
        self.emit("detail", detail_text(detail));
    }

    fn render_status(&self, area: StatusArea, message: &str) {
        let name = area_name(area);
        self.emit(&format!("status:{name}"), format!("{name}: {message}"));
    }
}
