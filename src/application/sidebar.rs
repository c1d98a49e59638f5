use crate::application::interaction::InteractionError;
use crate::domain::models::{Calendar, TaskGroup, validate_hex_color, validate_non_empty};
use crate::domain::store::{Action, Store};
use crate::infrastructure::api_client::AgendaApi;
use crate::infrastructure::command_log::CommandLog;
use crate::infrastructure::mapper::{calendar_from_wire, group_payload, task_group_from_wire};
use std::sync::Arc;

/// Calendar and task-list management from the sidebar.
pub struct SidebarController<A>
where
    A: AgendaApi + ?Sized,
{
    api: Arc<A>,
    store: Arc<Store>,
    log: Arc<CommandLog>,
}

impl<A> SidebarController<A>
where
    A: AgendaApi + ?Sized,
{
    pub fn new(api: Arc<A>, store: Arc<Store>, log: Arc<CommandLog>) -> Self {
        Self { api, store, log }
    }

    pub async fn create_calendar(&self, title: &str, color: &str) -> Result<Calendar, InteractionError> {
        validate_group(title, color, "calendar")?;
        let response = self
            .api
            .create_calendar(&group_payload(title, color))
            .await
            .inspect_err(|error| self.log.error("create_calendar", &error.to_string()))?;
        let calendar = calendar_from_wire(&response)?;
        self.store.dispatch(Action::AddCalendar(calendar.clone()))?;
        self.log
            .info("create_calendar", &format!("created calendar_id={}", calendar.id));
        Ok(calendar)
    }

    pub async fn update_calendar(
        &self,
        id: &str,
        title: &str,
        color: &str,
    ) -> Result<Calendar, InteractionError> {
        let id = required_id(id, "calendar")?;
        validate_group(title, color, "calendar")?;
        let response = self
            .api
            .update_calendar(id, &group_payload(title, color))
            .await
            .inspect_err(|error| self.log.error("update_calendar", &error.to_string()))?;
        let calendar = calendar_from_wire(&response)?;
        self.store.dispatch(Action::UpdateCalendar(calendar.clone()))?;
        self.log.info("update_calendar", &format!("updated calendar_id={id}"));
        Ok(calendar)
    }

    /// Deletes a calendar and, once the backend confirms, its events.
    pub async fn delete_calendar(&self, id: &str) -> Result<(), InteractionError> {
        let id = required_id(id, "calendar")?;
        self.api
            .delete_calendar(id)
            .await
            .inspect_err(|error| self.log.error("delete_calendar", &error.to_string()))?;
        self.store.dispatch(Action::DeleteCalendar(id.to_string()))?;
        self.log.info("delete_calendar", &format!("deleted calendar_id={id}"));
        Ok(())
    }

    pub async fn create_task_group(&self, title: &str, color: &str) -> Result<TaskGroup, InteractionError> {
        validate_group(title, color, "task list")?;
        let response = self
            .api
            .create_task_group(&group_payload(title, color))
            .await
            .inspect_err(|error| self.log.error("create_task_group", &error.to_string()))?;
        let group = task_group_from_wire(&response)?;
        self.store.dispatch(Action::AddTaskGroup(group.clone()))?;
        self.log
            .info("create_task_group", &format!("created task_group_id={}", group.id));
        Ok(group)
    }

    pub async fn update_task_group(
        &self,
        id: &str,
        title: &str,
        color: &str,
    ) -> Result<TaskGroup, InteractionError> {
        let id = required_id(id, "task list")?;
        validate_group(title, color, "task list")?;
        let response = self
            .api
            .update_task_group(id, &group_payload(title, color))
            .await
            .inspect_err(|error| self.log.error("update_task_group", &error.to_string()))?;
        let group = task_group_from_wire(&response)?;
        self.store.dispatch(Action::UpdateTaskGroup(group.clone()))?;
        self.log
            .info("update_task_group", &format!("updated task_group_id={id}"));
        Ok(group)
    }

    /// Deletes a task list and, once the backend confirms, its tasks.
    pub async fn delete_task_group(&self, id: &str) -> Result<(), InteractionError> {
        let id = required_id(id, "task list")?;
        self.api
            .delete_task_group(id)
            .await
            .inspect_err(|error| self.log.error("delete_task_group", &error.to_string()))?;
        self.store.dispatch(Action::DeleteTaskGroup(id.to_string()))?;
        self.log
            .info("delete_task_group", &format!("deleted task_group_id={id}"));
        Ok(())
    }
}

fn validate_group(title: &str, color: &str, kind: &str) -> Result<(), InteractionError> {
    validate_non_empty(title, &format!("{kind} title"))
        .and_then(|_| validate_hex_color(color, &format!("{kind} color")))
        .map_err(InteractionError::Validation)
}

fn required_id<'a>(id: &'a str, kind: &str) -> Result<&'a str, InteractionError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(InteractionError::Validation(format!("{kind} id must not be empty")));
    }
    Ok(id)
}
