//! In-process stand-in for the agenda backend used by controller tests.

use crate::infrastructure::api_client::AgendaApi;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::wire::{
    EventPayload, GroupPayload, RangeQuery, TaskPayload, WireEvent, WireGroup, WireId, WireTask,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::time::{sleep, Duration};

#[derive(Debug, Default)]
pub struct FakeAgendaApi {
    pub events: Mutex<Vec<WireEvent>>,
    pub tasks: Mutex<Vec<WireTask>>,
    pub calendars: Mutex<Vec<WireGroup>>,
    pub task_groups: Mutex<Vec<WireGroup>>,
    pub calls: Mutex<Vec<String>>,
    pub event_payloads: Mutex<Vec<EventPayload>>,
    pub task_payloads: Mutex<Vec<TaskPayload>>,
    pub group_payloads: Mutex<Vec<GroupPayload>>,
    ranged_events: Mutex<HashMap<String, Vec<WireEvent>>>,
    list_delays: Mutex<HashMap<String, u64>>,
    failure: Mutex<Option<(u16, String)>>,
    next_id: AtomicI64,
}

impl FakeAgendaApi {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Self::default()
        }
    }

    pub fn with_calendars(self, ids: &[i64]) -> Self {
        *self.calendars.lock().expect("calendars lock") = ids
            .iter()
            .map(|id| WireGroup {
                id: WireId::Number(*id),
                title: format!("Calendar {id}"),
                color: Some("#4A90E2".to_string()),
            })
            .collect();
        self
    }

    pub fn with_task_groups(self, ids: &[i64]) -> Self {
        *self.task_groups.lock().expect("groups lock") = ids
            .iter()
            .map(|id| WireGroup {
                id: WireId::Number(*id),
                title: format!("Group {id}"),
                color: Some("#998419".to_string()),
            })
            .collect();
        self
    }

    pub fn push_event(&self, event: WireEvent) {
        self.events.lock().expect("events lock").push(event);
    }

    pub fn push_task(&self, task: WireTask) {
        self.tasks.lock().expect("tasks lock").push(task);
    }

    /// Events returned when the list range starts at `start`.
    pub fn events_for_range(&self, start: &str, events: Vec<WireEvent>) {
        self.ranged_events
            .lock()
            .expect("ranged events lock")
            .insert(start.to_string(), events);
    }

    pub fn delay_range(&self, start: &str, millis: u64) {
        self.list_delays
            .lock()
            .expect("delays lock")
            .insert(start.to_string(), millis);
    }

    pub fn fail_with(&self, status: u16, message: &str) {
        *self.failure.lock().expect("failure lock") = Some((status, message.to_string()));
    }

    pub fn recover(&self) {
        *self.failure.lock().expect("failure lock") = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn call(&self, name: String) -> Result<(), InfraError> {
        self.calls.lock().expect("calls lock").push(name);
        match self.failure.lock().expect("failure lock").as_ref() {
            Some((status, message)) => Err(InfraError::Http {
                status: *status,
                message: message.clone(),
                body: None,
            }),
            None => Ok(()),
        }
    }

    fn allocate_id(&self) -> WireId {
        WireId::Number(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn range_delay(&self, range: &RangeQuery) {
        let delay = range.start.as_ref().and_then(|start| {
            self.list_delays
                .lock()
                .expect("delays lock")
                .get(start)
                .copied()
        });
        if let Some(millis) = delay {
            sleep(Duration::from_millis(millis)).await;
        }
    }

    fn not_found(kind: &str, id: &str) -> InfraError {
        InfraError::Http {
            status: 404,
            message: format!("{kind} {id} not found"),
            body: None,
        }
    }
}

/// The backend answers with seconds included, like Python's `isoformat()`.
fn server_timestamp(value: &str) -> String {
    let value = value.trim();
    if value.len() == 16 {
        format!("{value}:00")
    } else if value.len() == 10 {
        format!("{value}T00:00:00")
    } else {
        value.to_string()
    }
}

fn apply_group(group: &mut WireGroup, payload: &GroupPayload) {
    if let Some(title) = &payload.title {
        group.title = title.clone();
    }
    if let Some(color) = &payload.color {
        group.color = Some(color.clone());
    }
}

#[async_trait]
impl AgendaApi for FakeAgendaApi {
    async fn list_events(&self, range: &RangeQuery) -> Result<Vec<WireEvent>, InfraError> {
        self.range_delay(range).await;
        self.call("list_events".to_string())?;
        if let Some(start) = range.start.as_ref() {
            if let Some(events) = self.ranged_events.lock().expect("ranged lock").get(start) {
                return Ok(events.clone());
            }
        }
        Ok(self.events.lock().expect("events lock").clone())
    }

    async fn create_event(&self, payload: &EventPayload) -> Result<WireEvent, InfraError> {
        self.call("create_event".to_string())?;
        self.event_payloads.lock().expect("payloads lock").push(payload.clone());
        let created = WireEvent {
            id: self.allocate_id(),
            title: payload.title.clone().unwrap_or_default(),
            start_date: server_timestamp(payload.start_date.as_deref().unwrap_or_default()),
            end_date: payload.end_date.as_deref().map(server_timestamp),
            calendar_id: payload.calendar_id.map(WireId::Number),
            color: payload.color.clone(),
            description: payload.description.clone(),
        };
        self.push_event(created.clone());
        Ok(created)
    }

    async fn update_event(&self, id: &str, payload: &EventPayload) -> Result<WireEvent, InfraError> {
        self.call(format!("update_event:{id}"))?;
        self.event_payloads.lock().expect("payloads lock").push(payload.clone());
        let mut events = self.events.lock().expect("events lock");
        let event = events
            .iter_mut()
            .find(|event| event.id.to_string() == id)
            .ok_or_else(|| Self::not_found("event", id))?;
        if let Some(title) = &payload.title {
            event.title = title.clone();
        }
        if let Some(start) = &payload.start_date {
            event.start_date = server_timestamp(start);
        }
        if let Some(end) = &payload.end_date {
            event.end_date = Some(server_timestamp(end));
        }
        if let Some(calendar_id) = payload.calendar_id {
            event.calendar_id = Some(WireId::Number(calendar_id));
        }
        if let Some(color) = &payload.color {
            event.color = Some(color.clone());
        }
        if let Some(description) = &payload.description {
            event.description = Some(description.clone());
        }
        Ok(event.clone())
    }

    async fn delete_event(&self, id: &str) -> Result<(), InfraError> {
        self.call(format!("delete_event:{id}"))?;
        self.events
            .lock()
            .expect("events lock")
            .retain(|event| event.id.to_string() != id);
        Ok(())
    }

    async fn list_tasks(&self, range: &RangeQuery) -> Result<Vec<WireTask>, InfraError> {
        self.range_delay(range).await;
        self.call("list_tasks".to_string())?;
        Ok(self.tasks.lock().expect("tasks lock").clone())
    }

    async fn create_task(&self, payload: &TaskPayload) -> Result<WireTask, InfraError> {
        self.call("create_task".to_string())?;
        self.task_payloads.lock().expect("payloads lock").push(payload.clone());
        let created = WireTask {
            id: self.allocate_id(),
            title: payload.title.clone().unwrap_or_default(),
            date: payload.date.as_deref().map(server_timestamp),
            task_group_id: payload.task_group_id.map(WireId::Number),
            status: payload.status,
            color: payload.color.clone(),
            recurrencia: None,
        };
        self.push_task(created.clone());
        Ok(created)
    }

    async fn update_task(&self, id: &str, payload: &TaskPayload) -> Result<WireTask, InfraError> {
        self.call(format!("update_task:{id}"))?;
        self.task_payloads.lock().expect("payloads lock").push(payload.clone());
        let mut tasks = self.tasks.lock().expect("tasks lock");
        let task = tasks
            .iter_mut()
            .find(|task| task.id.to_string() == id)
            .ok_or_else(|| Self::not_found("task", id))?;
        if let Some(title) = &payload.title {
            task.title = title.clone();
        }
        if let Some(date) = &payload.date {
            task.date = Some(server_timestamp(date));
        }
        if let Some(group_id) = payload.task_group_id {
            task.task_group_id = Some(WireId::Number(group_id));
        }
        if let Some(status) = payload.status {
            task.status = Some(status);
        }
        if let Some(color) = &payload.color {
            task.color = Some(color.clone());
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &str) -> Result<(), InfraError> {
        self.call(format!("delete_task:{id}"))?;
        self.tasks
            .lock()
            .expect("tasks lock")
            .retain(|task| task.id.to_string() != id);
        Ok(())
    }

    async fn list_calendars(&self) -> Result<Vec<WireGroup>, InfraError> {
        self.call("list_calendars".to_string())?;
        Ok(self.calendars.lock().expect("calendars lock").clone())
    }

    async fn create_calendar(&self, payload: &GroupPayload) -> Result<WireGroup, InfraError> {
        self.call("create_calendar".to_string())?;
        self.group_payloads.lock().expect("payloads lock").push(payload.clone());
        let created = WireGroup {
            id: self.allocate_id(),
            title: payload.title.clone().unwrap_or_default(),
            color: payload.color.clone(),
        };
        self.calendars.lock().expect("calendars lock").push(created.clone());
        Ok(created)
    }

    async fn update_calendar(&self, id: &str, payload: &GroupPayload) -> Result<WireGroup, InfraError> {
        self.call(format!("update_calendar:{id}"))?;
        self.group_payloads.lock().expect("payloads lock").push(payload.clone());
        let mut calendars = self.calendars.lock().expect("calendars lock");
        let calendar = calendars
            .iter_mut()
            .find(|calendar| calendar.id.to_string() == id)
            .ok_or_else(|| Self::not_found("calendar", id))?;
        apply_group(calendar, payload);
        Ok(calendar.clone())
    }

    async fn delete_calendar(&self, id: &str) -> Result<(), InfraError> {
        self.call(format!("delete_calendar:{id}"))?;
        self.calendars
            .lock()
            .expect("calendars lock")
            .retain(|calendar| calendar.id.to_string() != id);
        Ok(())
    }

    async fn list_task_groups(&self) -> Result<Vec<WireGroup>, InfraError> {
        self.call("list_task_groups".to_string())?;
        Ok(self.task_groups.lock().expect("groups lock").clone())
    }

    async fn create_task_group(&self, payload: &GroupPayload) -> Result<WireGroup, InfraError> {
        self.call("create_task_group".to_string())?;
        self.group_payloads.lock().expect("payloads lock").push(payload.clone());
        let created = WireGroup {
            id: self.allocate_id(),
            title: payload.title.clone().unwrap_or_default(),
            color: payload.color.clone(),
        };
        self.task_groups.lock().expect("groups lock").push(created.clone());
        Ok(created)
    }

    async fn update_task_group(&self, id: &str, payload: &GroupPayload) -> Result<WireGroup, InfraError> {
        self.call(format!("update_task_group:{id}"))?;
        self.group_payloads.lock().expect("payloads lock").push(payload.clone());
        let mut groups = self.task_groups.lock().expect("groups lock");
        let group = groups
            .iter_mut()
            .find(|group| group.id.to_string() == id)
            .ok_or_else(|| Self::not_found("task group", id))?;
        apply_group(group, payload);
        Ok(group.clone())
    }

    async fn delete_task_group(&self, id: &str) -> Result<(), InfraError> {
        self.call(format!("delete_task_group:{id}"))?;
        self.task_groups
            .lock()
            .expect("groups lock")
            .retain(|group| group.id.to_string() != id);
        Ok(())
    }
}
