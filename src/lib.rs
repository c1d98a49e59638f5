//! Client-side synchronization and view-model layer for the agenda calendar.
//!
//! A renderer drives this crate: it reports the visible range, popover
//! interactions and drag/resize releases, and draws whatever the [`Store`]
//! holds afterwards.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::app_state::AppState;
pub use application::bootstrap::{BootstrapResult, HydrationSummary, bootstrap_workspace, hydrate};
pub use application::interaction::{InteractionController, InteractionError, ItemChange, SubmitOutcome};
pub use application::popover::{Point, PopoverItem, PopoverSession, PopoverState, Rect, Size, place_popover};
pub use application::range_sync::{RangeSyncOutcome, RangeSynchronizer, VisibleRange};
pub use application::sidebar::SidebarController;
pub use application::task_board::{BoardSection, TaskBoard, TaskBoardFilters, categorize_tasks};
pub use domain::models::{
    Calendar, CalendarItem, Event, EventDraft, ItemKind, Task, TaskDraft, TaskGroup,
};
pub use domain::store::{Action, Store, StoreError, StoreState, reduce};
pub use infrastructure::api_client::{AgendaApi, ReqwestAgendaApi};
pub use infrastructure::config::{AppConfig, PopoverDimensions};
pub use infrastructure::error::InfraError;
pub use infrastructure::session_store::{InMemorySessionStore, SessionStore};
