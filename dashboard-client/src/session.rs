//! Client session state
//!
//! One owned record holds the active run id, the directory caches, the last
//! run list and the form inputs. The active run id changes only through
//! `set_active_run`, which is called on explicit selection and on run
//! creation; nothing clears it.

use std::collections::HashSet;

use shared_types::{CreateRunRequest, RunId, RunSummary};

use crate::api::UploadFile;

/// Form inputs the user edits between actions
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub project: Option<String>,
    pub prompt: String,
    pub fast_model: Option<String>,
    pub deep_model: Option<String>,
    pub upload_project_name: String,
    pub selected_files: Vec<UploadFile>,
}

impl FormState {
    pub fn create_request(&self) -> CreateRunRequest {
        CreateRunRequest {
            project_path: self.project.clone().unwrap_or_default(),
            prompt: self.prompt.clone(),
            fast_model: normalize_model(self.fast_model.as_deref()),
            deep_model: normalize_model(self.deep_model.as_deref()),
        }
    }

    pub fn selected_file_names(&self) -> Vec<String> {
        self.selected_files
            .iter()
            .map(|file| file.file_name.clone())
            .collect()
    }

    /// `None` for a blank name so no part is sent
    pub fn upload_project_name(&self) -> Option<&str> {
        let name = self.upload_project_name.trim();
        (!name.is_empty()).then_some(name)
    }
}

/// The empty selection means "let the worker choose"
pub fn normalize_model(selection: Option<&str>) -> Option<String> {
    selection
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Issued when a run-detail fetch starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    pub run_id: RunId,
    pub seq: u64,
}

/// Whether a resolved run-detail response may be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Render,
    /// The active run changed while the fetch was in flight
    NotActive { active: Option<RunId> },
    /// A newer fetch for the same run already rendered
    Superseded { rendered_seq: u64 },
}

#[derive(Debug, Default)]
pub struct SessionState {
    active_run_id: Option<RunId>,
    models: Vec<String>,
    projects: Vec<String>,
    runs: Vec<RunSummary>,
    known_runs: HashSet<RunId>,
    runs_loaded: bool,
    next_detail_seq: u64,
    rendered_detail_seq: u64,
    next_runs_seq: u64,
    rendered_runs_seq: u64,
    pub form: FormState,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_run_id(&self) -> Option<&RunId> {
        self.active_run_id.as_ref()
    }

    pub fn set_active_run(&mut self, run_id: RunId) {
        self.active_run_id = Some(run_id);
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn set_models(&mut self, models: Vec<String>) {
        self.models = models;
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    pub fn set_projects(&mut self, projects: Vec<String>) {
        self.projects = projects;
    }

    pub fn runs(&self) -> &[RunSummary] {
        &self.runs
    }

    /// Replace the run list and return ids not seen before, in server order.
    /// The first load reports nothing.
    pub fn record_runs(&mut self, runs: Vec<RunSummary>) -> Vec<RunId> {
        let mut appeared = Vec::new();
        for run in &runs {
            if self.known_runs.insert(run.id.clone()) && self.runs_loaded {
                appeared.push(run.id.clone());
            }
        }
        self.runs_loaded = true;
        self.runs = runs;
        appeared
    }

    /// Issued when a run-list fetch starts
    pub fn issue_runs_ticket(&mut self) -> u64 {
        self.next_runs_seq += 1;
        self.next_runs_seq
    }

    /// A run-list response applies only if nothing issued later has
    pub fn admit_runs(&mut self, seq: u64) -> bool {
        if seq <= self.rendered_runs_seq {
            return false;
        }
        self.rendered_runs_seq = seq;
        true
    }

    pub fn issue_detail_ticket(&mut self, run_id: &RunId) -> DetailTicket {
        self.next_detail_seq += 1;
        DetailTicket {
            run_id: run_id.clone(),
            seq: self.next_detail_seq,
        }
    }

    /// Decide at resolution time whether a detail response renders; an
    /// admitted ticket becomes the newest rendered one
    pub fn admit_detail(&mut self, ticket: &DetailTicket) -> Admission {
        if self.active_run_id.as_ref() != Some(&ticket.run_id) {
            return Admission::NotActive {
                active: self.active_run_id.clone(),
            };
        }
        if ticket.seq <= self.rendered_detail_seq {
            return Admission::Superseded {
                rendered_seq: self.rendered_detail_seq,
            };
        }
        self.rendered_detail_seq = ticket.seq;
        Admission::Render
    }
}
