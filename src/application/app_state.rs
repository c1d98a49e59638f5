use crate::application::bootstrap::{HydrationSummary, bootstrap_workspace_with_lookup, hydrate};
use crate::application::interaction::{InteractionController, InteractionError};
use crate::application::popover::{PopoverSession, Size};
use crate::application::range_sync::RangeSynchronizer;
use crate::application::sidebar::SidebarController;
use crate::application::task_board::{TaskBoard, TaskBoardFilters, categorize_tasks};
use crate::domain::models::CalendarItem;
use crate::domain::store::{Store, StoreError};
use crate::infrastructure::api_client::{AgendaApi, ReqwestAgendaApi};
use crate::infrastructure::command_log::CommandLog;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::session_store::{InMemorySessionStore, SessionStore};
use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything one client session needs, built once at startup and handed to
/// the renderer. The store lives here rather than in a global.
pub struct AppState {
    config: AppConfig,
    session: Arc<dyn SessionStore>,
    api: Arc<dyn AgendaApi>,
    store: Arc<Store>,
    log: Arc<CommandLog>,
    range_sync: RangeSynchronizer<dyn AgendaApi>,
    interaction: InteractionController<dyn AgendaApi>,
    sidebar: SidebarController<dyn AgendaApi>,
}

impl AppState {
    pub fn new(workspace_root: PathBuf) -> Result<Self, InfraError> {
        Self::with_lookup(workspace_root, |key| std::env::var(key).ok())
    }

    pub fn with_lookup<F>(workspace_root: PathBuf, lookup: F) -> Result<Self, InfraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bootstrap = bootstrap_workspace_with_lookup(&workspace_root, lookup)?;
        let session: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::default());
        let api: Arc<dyn AgendaApi> = Arc::new(ReqwestAgendaApi::new(
            bootstrap.config.api_base_url.clone(),
            Arc::clone(&session),
        ));
        let log = Arc::new(CommandLog::to_dir(bootstrap.logs_dir));
        Ok(Self::from_parts(bootstrap.config, session, api, log))
    }

    pub fn from_parts(
        config: AppConfig,
        session: Arc<dyn SessionStore>,
        api: Arc<dyn AgendaApi>,
        log: Arc<CommandLog>,
    ) -> Self {
        let store = Arc::new(Store::new());
        let range_sync = RangeSynchronizer::new(Arc::clone(&api), Arc::clone(&store), Arc::clone(&log))
            .with_time_zone(config.time_zone);
        let interaction =
            InteractionController::new(Arc::clone(&api), Arc::clone(&store), Arc::clone(&log));
        let sidebar = SidebarController::new(Arc::clone(&api), Arc::clone(&store), Arc::clone(&log));
        Self {
            config,
            session,
            api,
            store,
            log,
            range_sync,
            interaction,
            sidebar,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    pub fn range_sync(&self) -> &RangeSynchronizer<dyn AgendaApi> {
        &self.range_sync
    }

    pub fn interaction(&self) -> &InteractionController<dyn AgendaApi> {
        &self.interaction
    }

    pub fn sidebar(&self) -> &SidebarController<dyn AgendaApi> {
        &self.sidebar
    }

    pub async fn hydrate(&self) -> Result<HydrationSummary, InteractionError> {
        hydrate(self.api.as_ref(), &self.store, &self.log).await
    }

    pub fn popover_session(&self, viewport: Size) -> PopoverSession {
        PopoverSession::new(self.config.popover, viewport)
    }

    pub fn calendar_items(&self) -> Result<Vec<CalendarItem>, StoreError> {
        self.store.read(|state| state.calendar_items())
    }

    pub fn task_board(&self, now: NaiveDateTime, filters: TaskBoardFilters) -> Result<TaskBoard, StoreError> {
        self.store
            .read(|state| categorize_tasks(&state.tasks, now, filters))
    }
}
