pub mod app_state;
pub mod bootstrap;
pub mod interaction;
pub mod popover;
pub mod range_sync;
pub mod sidebar;
pub mod task_board;

#[cfg(test)]
pub(crate) mod fake_api;
