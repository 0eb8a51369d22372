//! Commands typed at the prompt, one per line

use anyhow::{anyhow, bail};
use dashboard_client::{Dashboard, UploadFile};
use shared_types::{ChangeId, RunId};
use tracing::debug;

pub const HELP: &str = "\
commands:
  runs                     refresh the run list and the active run
  select <run id>          show a run and follow it
  accept <change id>       accept a change of the active run
  models | projects        reload the model or project list
  project <path>           choose the project for new runs
  model fast|deep [name]   choose a model; no name lets the worker pick
  prompt <text>            set the prompt for new runs
  create                   start a run from the current form
  files <path>...          choose local files to upload
  name <project name>      target project for the next upload (blank for default)
  upload                   upload the chosen files
  help                     show this help
  quit                     exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSlot {
    Fast,
    Deep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Select(RunId),
    Accept(ChangeId),
    Models,
    Projects,
    Project(String),
    Model(ModelSlot, Option<String>),
    Prompt(String),
    Create,
    Files(Vec<String>),
    UploadName(String),
    Upload,
    Help,
    Quit,
}

impl Command {
    /// `None` for a blank line
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb {
            "runs" | "refresh" => Self::Refresh,
            "select" => Self::Select(RunId::new(required(rest, "select <run id>")?)),
            "accept" => Self::Accept(ChangeId::new(required(rest, "accept <change id>")?)),
            "models" => Self::Models,
            "projects" => Self::Projects,
            "project" => Self::Project(required(rest, "project <path>")?.to_string()),
            "model" => {
                let (slot, name) = match rest.split_once(char::is_whitespace) {
                    Some((slot, name)) => (slot, name.trim()),
                    None => (rest, ""),
                };
                let slot = match slot {
                    "fast" => ModelSlot::Fast,
                    "deep" => ModelSlot::Deep,
                    _ => bail!("usage: model fast|deep [name]"),
                };
                Self::Model(slot, (!name.is_empty()).then(|| name.to_string()))
            }
            "prompt" => Self::Prompt(rest.to_string()),
            "create" => Self::Create,
            "files" => Self::Files(rest.split_whitespace().map(str::to_string).collect()),
            "name" => Self::UploadName(rest.to_string()),
            "upload" => Self::Upload,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(Some(command))
    }
}

fn required<'a>(value: &'a str, usage: &str) -> anyhow::Result<&'a str> {
    if value.is_empty() {
        Err(anyhow!("usage: {usage}"))
    } else {
        Ok(value)
    }
}

/// Run one command. Failures the dashboard already showed inline come back
/// as errors too, for the log.
pub async fn execute(dashboard: &Dashboard, command: Command) -> anyhow::Result<()> {
    debug!(?command, "executing command");
    match command {
        Command::Refresh => {
            dashboard.poll_once().await;
        }
        Command::Select(run_id) => {
            dashboard.select_run(run_id).await?;
        }
        Command::Accept(change_id) => {
            let run_id = dashboard
                .active_run_id()
                .await
                .ok_or_else(|| anyhow!("select a run before accepting changes"))?;
            dashboard.accept_change(&run_id, &change_id).await?;
        }
        Command::Models => dashboard.load_models().await?,
        Command::Projects => dashboard.load_projects(None).await?,
        Command::Project(path) => dashboard.select_project(Some(path)).await,
        Command::Model(ModelSlot::Fast, name) => dashboard.select_fast_model(name).await,
        Command::Model(ModelSlot::Deep, name) => dashboard.select_deep_model(name).await,
        Command::Prompt(text) => dashboard.set_prompt(text).await,
        Command::Create => {
            dashboard.create_run().await?;
        }
        Command::Files(paths) => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                files.push(UploadFile::from_path(path).await?);
            }
            dashboard.select_files(files).await;
        }
        Command::UploadName(name) => dashboard.set_upload_project_name(name).await,
        Command::Upload => {
            dashboard.upload_selected_files().await?;
        }
        Command::Help | Command::Quit => {}
    }
    Ok(())
}
