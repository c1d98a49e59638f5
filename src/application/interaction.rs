use crate::domain::models::{CalendarItem, Event, EventDraft, ItemKind, Task, TaskDraft};
use crate::domain::schedule::{self, format_local, normalize_window};
use crate::domain::store::{Action, Store, StoreError};
use crate::infrastructure::api_client::AgendaApi;
use crate::infrastructure::command_log::CommandLog;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::mapper::{event_from_wire, event_payload, numeric_id, task_from_wire, task_payload};
use crate::infrastructure::wire::{EventPayload, TaskPayload};
use chrono::NaiveDateTime;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InteractionError {
    /// Shown to the user as a blocking alert; nothing was sent or stored.
    #[error("{0}")]
    Validation(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Infra(InfraError),
}

impl From<InfraError> for InteractionError {
    fn from(error: InfraError) -> Self {
        match error {
            InfraError::Validation(message) => Self::Validation(message),
            other => Self::Infra(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank title; the form is left as is.
    Skipped,
    Created(String),
    Updated(String),
}

/// A drag-release or resize-release reported by the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChange {
    pub kind: ItemKind,
    pub id: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
}

/// Write path for events and tasks. The store only changes after the
/// backend has confirmed, and always with the backend's version of the item.
pub struct InteractionController<A>
where
    A: AgendaApi + ?Sized,
{
    api: Arc<A>,
    store: Arc<Store>,
    log: Arc<CommandLog>,
}

impl<A> InteractionController<A>
where
    A: AgendaApi + ?Sized,
{
    pub fn new(api: Arc<A>, store: Arc<Store>, log: Arc<CommandLog>) -> Self {
        Self { api, store, log }
    }

    pub async fn submit_event(&self, draft: &EventDraft) -> Result<SubmitOutcome, InteractionError> {
        if draft.title.trim().is_empty() {
            return Ok(SubmitOutcome::Skipped);
        }
        let command = if existing_id(draft.id.as_deref()).is_some() {
            "update_event"
        } else {
            "create_event"
        };
        self.save_event(draft)
            .await
            .inspect_err(|error| self.log.error(command, &error.to_string()))
    }

    pub async fn submit_task(&self, draft: &TaskDraft) -> Result<SubmitOutcome, InteractionError> {
        if draft.title.trim().is_empty() {
            return Ok(SubmitOutcome::Skipped);
        }
        let command = if existing_id(draft.id.as_deref()).is_some() {
            "update_task"
        } else {
            "create_task"
        };
        self.save_task(draft)
            .await
            .inspect_err(|error| self.log.error(command, &error.to_string()))
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), InteractionError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(());
        }
        self.api
            .delete_event(id)
            .await
            .inspect_err(|error| self.log.error("delete_event", &error.to_string()))?;
        self.store.dispatch(Action::DeleteEvent(id.to_string()))?;
        self.log.info("delete_event", &format!("deleted event_id={id}"));
        Ok(())
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), InteractionError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(());
        }
        self.api
            .delete_task(id)
            .await
            .inspect_err(|error| self.log.error("delete_task", &error.to_string()))?;
        self.store.dispatch(Action::DeleteTask(id.to_string()))?;
        self.log.info("delete_task", &format!("deleted task_id={id}"));
        Ok(())
    }

    /// Flips `done` through the backend; there is no local-only toggle.
    pub async fn toggle_task_done(&self, id: &str) -> Result<Task, InteractionError> {
        let current = self.stored_task(id)?;
        let payload = TaskPayload {
            status: Some(!current.done),
            date: current.wire_date(),
            ..TaskPayload::default()
        };
        let task = self
            .update_task(&current.id, &payload)
            .await
            .inspect_err(|error| self.log.error("toggle_task_done", &error.to_string()))?;
        self.log.info(
            "toggle_task_done",
            &format!("task_id={} done={}", task.id, task.done),
        );
        Ok(task)
    }

    pub async fn rename_task(&self, id: &str, title: &str) -> Result<Task, InteractionError> {
        let current = self.stored_task(id)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(InteractionError::Validation(
                "Task title must not be empty".to_string(),
            ));
        }
        if title == current.title {
            return Ok(current);
        }
        let payload = TaskPayload {
            title: Some(title.to_string()),
            ..TaskPayload::default()
        };
        let task = self
            .update_task(&current.id, &payload)
            .await
            .inspect_err(|error| self.log.error("rename_task", &error.to_string()))?;
        self.log.info("rename_task", &format!("renamed task_id={}", task.id));
        Ok(task)
    }

    /// Persists a drag or resize and returns the item as the backend stored it,
    /// for the renderer to re-apply.
    pub async fn move_item(&self, change: &ItemChange) -> Result<CalendarItem, InteractionError> {
        match change.kind {
            ItemKind::Event => self
                .move_event(change)
                .await
                .inspect_err(|error| self.log.error("move_event", &error.to_string())),
            ItemKind::Task => self
                .move_task(change)
                .await
                .inspect_err(|error| self.log.error("move_task", &error.to_string())),
        }
    }

    async fn save_event(&self, draft: &EventDraft) -> Result<SubmitOutcome, InteractionError> {
        let calendar_id = self.resolve_calendar(draft.calendar_id.as_deref())?;
        numeric_id(&calendar_id, "calendar_id").map_err(|_| {
            InteractionError::Validation(format!(
                "Calendar '{calendar_id}' cannot own events; pick another calendar"
            ))
        })?;

        let event = normalized_event(draft, calendar_id)?;
        let payload = event_payload(&event)?;
        let (response, created) = match existing_id(draft.id.as_deref()) {
            Some(id) => (self.api.update_event(id, &payload).await?, false),
            None => (self.api.create_event(&payload).await?, true),
        };

        let mut stored = event_from_wire(&response)?;
        stored.all_day = draft.all_day;
        let id = stored.id.clone();
        if created {
            self.store.dispatch(Action::AddEvent(stored))?;
            self.log.info("create_event", &format!("created event_id={id}"));
            Ok(SubmitOutcome::Created(id))
        } else {
            self.store.dispatch(Action::UpdateEvent(stored))?;
            self.log.info("update_event", &format!("updated event_id={id}"));
            Ok(SubmitOutcome::Updated(id))
        }
    }

    async fn save_task(&self, draft: &TaskDraft) -> Result<SubmitOutcome, InteractionError> {
        let group_id = self.resolve_task_group(draft.group_id.as_deref())?;
        let task = Task {
            id: draft.id.clone().unwrap_or_default(),
            title: draft.title.trim().to_string(),
            start_date: non_blank(&draft.start_date),
            start_time: non_blank(&draft.start_time),
            done: draft.done,
            group_id: Some(group_id),
            color: draft.color.clone(),
            repeat: false,
        };
        if let Some(date) = task.start_date.as_deref() {
            schedule::combine(date, task.start_time.as_deref()).ok_or_else(|| {
                InteractionError::Validation(format!("Invalid task date '{date}'"))
            })?;
        }
        let payload = task_payload(&task)?;
        let (response, created) = match existing_id(draft.id.as_deref()) {
            Some(id) => (self.api.update_task(id, &payload).await?, false),
            None => (self.api.create_task(&payload).await?, true),
        };

        let stored = task_from_wire(&response)?;
        let id = stored.id.clone();
        if created {
            self.store.dispatch(Action::AddTask(stored))?;
            self.log.info("create_task", &format!("created task_id={id}"));
            Ok(SubmitOutcome::Created(id))
        } else {
            self.store.dispatch(Action::UpdateTask(stored))?;
            self.log.info("update_task", &format!("updated task_id={id}"));
            Ok(SubmitOutcome::Updated(id))
        }
    }

    async fn move_event(&self, change: &ItemChange) -> Result<CalendarItem, InteractionError> {
        let (start, end) = normalize_window(change.start, change.end, change.all_day);
        let payload = EventPayload {
            start_date: Some(format_local(start)),
            end_date: Some(format_local(end)),
            ..EventPayload::default()
        };
        let response = self.api.update_event(&change.id, &payload).await?;

        let mut event = event_from_wire(&response)?;
        event.all_day = change.all_day;
        let calendar_color = self
            .store
            .read(|state| state.calendar(&event.calendar_id).map(|calendar| calendar.color.clone()))?;
        let item = CalendarItem::from_event(&event, calendar_color.as_deref())
            .ok_or_else(|| InfraError::Payload(format!("event {} has no start", event.id)))?;
        self.store.dispatch(Action::UpdateEvent(event))?;
        self.log.info(
            "move_event",
            &format!("moved event_id={} to {}", item.id, format_local(item.start)),
        );
        Ok(item)
    }

    async fn move_task(&self, change: &ItemChange) -> Result<CalendarItem, InteractionError> {
        let payload = TaskPayload {
            date: Some(format_local(change.start)),
            ..TaskPayload::default()
        };
        let response = self.api.update_task(&change.id, &payload).await?;

        let task = task_from_wire(&response)?;
        let group_color = match task.group_id.as_deref() {
            Some(group_id) => self
                .store
                .read(|state| state.task_group(group_id).map(|group| group.color.clone()))?,
            None => None,
        };
        let item = CalendarItem::from_task(&task, group_color.as_deref())
            .ok_or_else(|| InfraError::Payload(format!("task {} has no date", task.id)))?;
        self.store.dispatch(Action::UpdateTask(task))?;
        self.log.info(
            "move_task",
            &format!("moved task_id={} to {}", item.id, format_local(item.start)),
        );
        Ok(item)
    }

    async fn update_task(&self, id: &str, payload: &TaskPayload) -> Result<Task, InteractionError> {
        let response = self.api.update_task(id, payload).await?;
        let task = task_from_wire(&response)?;
        self.store.dispatch(Action::UpdateTask(task.clone()))?;
        Ok(task)
    }

    fn stored_task(&self, id: &str) -> Result<Task, InteractionError> {
        let id = id.trim();
        self.store
            .read(|state| state.task(id).cloned())?
            .ok_or_else(|| InteractionError::NotFound {
                kind: "task",
                id: id.to_string(),
            })
    }

    fn resolve_calendar(&self, selected: Option<&str>) -> Result<String, InteractionError> {
        if let Some(selected) = existing_id(selected) {
            return Ok(selected.to_string());
        }
        self.store
            .read(|state| state.calendars.first().map(|calendar| calendar.id.clone()))?
            .ok_or_else(|| {
                InteractionError::Validation(
                    "Create a calendar before adding events".to_string(),
                )
            })
    }

    fn resolve_task_group(&self, selected: Option<&str>) -> Result<String, InteractionError> {
        if let Some(selected) = existing_id(selected) {
            return Ok(selected.to_string());
        }
        self.store
            .read(|state| state.task_groups.first().map(|group| group.id.clone()))?
            .ok_or_else(|| {
                InteractionError::Validation(
                    "Create a task list before adding tasks".to_string(),
                )
            })
    }
}

fn existing_id(id: Option<&str>) -> Option<&str> {
    id.map(str::trim).filter(|value| !value.is_empty())
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Resolves the draft's dates into an event whose end is strictly after its start.
fn normalized_event(draft: &EventDraft, calendar_id: String) -> Result<Event, InteractionError> {
    let start_time = (!draft.all_day).then_some(draft.start_time.as_str());
    let end_time = (!draft.all_day).then_some(draft.end_time.as_str());
    let start = schedule::combine(&draft.start_date, start_time).ok_or_else(|| {
        InteractionError::Validation(format!("Invalid start date '{}'", draft.start_date))
    })?;
    let end = match draft.end_date.trim() {
        "" => None,
        date => Some(schedule::combine(date, end_time).ok_or_else(|| {
            InteractionError::Validation(format!("Invalid end date '{date}'"))
        })?),
    };
    let (start, end) = normalize_window(start, end, draft.all_day);

    Ok(Event {
        id: draft.id.clone().unwrap_or_default(),
        title: draft.title.trim().to_string(),
        start_date: start.format("%Y-%m-%d").to_string(),
        start_time: (!draft.all_day).then(|| start.format("%H:%M").to_string()),
        end_date: Some(end.format("%Y-%m-%d").to_string()),
        end_time: (!draft.all_day).then(|| end.format("%H:%M").to_string()),
        all_day: draft.all_day,
        calendar_id,
        color: draft.color.clone(),
        description: draft.description.clone(),
    })
}
