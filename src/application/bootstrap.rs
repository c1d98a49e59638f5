use crate::application::interaction::InteractionError;
use crate::domain::store::{Action, Store};
use crate::infrastructure::api_client::AgendaApi;
use crate::infrastructure::command_log::CommandLog;
use crate::infrastructure::config::{AppConfig, ensure_default_configs, load_app_config_with_lookup};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::mapper::{calendar_from_wire, task_group_from_wire};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct BootstrapResult {
    pub workspace_root: PathBuf,
    pub config_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub config: AppConfig,
}

pub fn bootstrap_workspace(workspace_root: &Path) -> Result<BootstrapResult, InfraError> {
    bootstrap_workspace_with_lookup(workspace_root, |key| std::env::var(key).ok())
}

pub fn bootstrap_workspace_with_lookup<F>(
    workspace_root: &Path,
    lookup: F,
) -> Result<BootstrapResult, InfraError>
where
    F: Fn(&str) -> Option<String>,
{
    let config_dir = workspace_root.join("config");
    let logs_dir = workspace_root.join("logs");

    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&logs_dir)?;

    ensure_default_configs(&config_dir)?;
    let config = load_app_config_with_lookup(&config_dir, lookup)?;

    Ok(BootstrapResult {
        workspace_root: workspace_root.to_path_buf(),
        config_dir,
        logs_dir,
        config,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HydrationSummary {
    pub calendars: usize,
    pub task_groups: usize,
}

/// Loads the sidebar collections. Events and tasks arrive later through range sync.
pub async fn hydrate<A>(
    api: &A,
    store: &Store,
    log: &CommandLog,
) -> Result<HydrationSummary, InteractionError>
where
    A: AgendaApi + ?Sized,
{
    let (calendars, task_groups) = tokio::join!(api.list_calendars(), api.list_task_groups());
    let loaded = calendars
        .and_then(|calendars| calendars.iter().map(calendar_from_wire).collect::<Result<Vec<_>, _>>())
        .and_then(|calendars| {
            task_groups
                .and_then(|groups| groups.iter().map(task_group_from_wire).collect::<Result<Vec<_>, _>>())
                .map(|groups| (calendars, groups))
        });
    let (calendars, task_groups) = loaded.inspect_err(|error| log.error("hydrate", &error.to_string()))?;

    let summary = HydrationSummary {
        calendars: calendars.len(),
        task_groups: task_groups.len(),
    };
    store.dispatch_all([Action::SetCalendars(calendars), Action::SetTaskGroups(task_groups)])?;
    log.info(
        "hydrate",
        &format!(
            "loaded {} calendars and {} task groups",
            summary.calendars, summary.task_groups
        ),
    );
    Ok(summary)
}
