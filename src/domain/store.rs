use crate::domain::models::{Calendar, CalendarItem, Event, Task, TaskGroup};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown action type: {0}")]
    UnknownAction(String),
    #[error("invalid action payload: {0}")]
    InvalidPayload(String),
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub calendars: Vec<Calendar>,
    pub task_groups: Vec<TaskGroup>,
    pub events: Vec<Event>,
    pub tasks: Vec<Task>,
}

impl StoreState {
    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn calendar(&self, id: &str) -> Option<&Calendar> {
        self.calendars.iter().find(|calendar| calendar.id == id)
    }

    pub fn task_group(&self, id: &str) -> Option<&TaskGroup> {
        self.task_groups.iter().find(|group| group.id == id)
    }

    /// Everything the grid draws: dated events and scheduled tasks, colored
    /// by their owning calendar or group.
    pub fn calendar_items(&self) -> Vec<CalendarItem> {
        let events = self.events.iter().filter_map(|event| {
            let color = self
                .calendar(&event.calendar_id)
                .map(|calendar| calendar.color.as_str());
            CalendarItem::from_event(event, color)
        });
        let tasks = self.tasks.iter().filter_map(|task| {
            let color = task
                .group_id
                .as_deref()
                .and_then(|group_id| self.task_group(group_id))
                .map(|group| group.color.as_str());
            CalendarItem::from_task(task, color)
        });
        events.chain(tasks).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Action {
    #[serde(rename = "SET_CALENDARS")]
    SetCalendars(Vec<Calendar>),
    #[serde(rename = "SET_TASKGROUPS")]
    SetTaskGroups(Vec<TaskGroup>),
    #[serde(rename = "SET_EVENTS")]
    SetEvents(Vec<Event>),
    #[serde(rename = "SET_TASKS")]
    SetTasks(Vec<Task>),
    #[serde(rename = "ADD_CALENDAR")]
    AddCalendar(Calendar),
    #[serde(rename = "UPDATE_CALENDAR")]
    UpdateCalendar(Calendar),
    #[serde(rename = "DELETE_CALENDAR")]
    DeleteCalendar(String),
    #[serde(rename = "ADD_TASKGROUP")]
    AddTaskGroup(TaskGroup),
    #[serde(rename = "UPDATE_TASKGROUP")]
    UpdateTaskGroup(TaskGroup),
    #[serde(rename = "DELETE_TASKGROUP")]
    DeleteTaskGroup(String),
    #[serde(rename = "ADD_EVENT")]
    AddEvent(Event),
    #[serde(rename = "UPDATE_EVENT")]
    UpdateEvent(Event),
    #[serde(rename = "DELETE_EVENT")]
    DeleteEvent(String),
    #[serde(rename = "ADD_TASK")]
    AddTask(Task),
    #[serde(rename = "UPDATE_TASK")]
    UpdateTask(Task),
    #[serde(rename = "DELETE_TASK")]
    DeleteTask(String),
}

pub const ACTION_TYPES: [&str; 16] = [
    "SET_CALENDARS",
    "SET_TASKGROUPS",
    "SET_EVENTS",
    "SET_TASKS",
    "ADD_CALENDAR",
    "UPDATE_CALENDAR",
    "DELETE_CALENDAR",
    "ADD_TASKGROUP",
    "UPDATE_TASKGROUP",
    "DELETE_TASKGROUP",
    "ADD_EVENT",
    "UPDATE_EVENT",
    "DELETE_EVENT",
    "ADD_TASK",
    "UPDATE_TASK",
    "DELETE_TASK",
];

impl Action {
    /// Decodes an action sent by the renderer as `{ "type": ..., "payload": ... }`.
    pub fn from_json(value: serde_json::Value) -> Result<Self, StoreError> {
        let action_type = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        if !ACTION_TYPES.contains(&action_type.as_str()) {
            return Err(StoreError::UnknownAction(action_type));
        }
        serde_json::from_value(value)
            .map_err(|error| StoreError::InvalidPayload(format!("{action_type}: {error}")))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SetCalendars(_) => "SET_CALENDARS",
            Self::SetTaskGroups(_) => "SET_TASKGROUPS",
            Self::SetEvents(_) => "SET_EVENTS",
            Self::SetTasks(_) => "SET_TASKS",
            Self::AddCalendar(_) => "ADD_CALENDAR",
            Self::UpdateCalendar(_) => "UPDATE_CALENDAR",
            Self::DeleteCalendar(_) => "DELETE_CALENDAR",
            Self::AddTaskGroup(_) => "ADD_TASKGROUP",
            Self::UpdateTaskGroup(_) => "UPDATE_TASKGROUP",
            Self::DeleteTaskGroup(_) => "DELETE_TASKGROUP",
            Self::AddEvent(_) => "ADD_EVENT",
            Self::UpdateEvent(_) => "UPDATE_EVENT",
            Self::DeleteEvent(_) => "DELETE_EVENT",
            Self::AddTask(_) => "ADD_TASK",
            Self::UpdateTask(_) => "UPDATE_TASK",
            Self::DeleteTask(_) => "DELETE_TASK",
        }
    }
}

fn replace_by_id<T: Clone>(items: &[T], updated: T, id_of: impl Fn(&T) -> &str) -> Vec<T> {
    let id = id_of(&updated).to_string();
    items
        .iter()
        .map(|item| {
            if id_of(item) == id {
                updated.clone()
            } else {
                item.clone()
            }
        })
        .collect()
}

pub fn reduce(state: &StoreState, action: Action) -> StoreState {
    let mut next = state.clone();
    match action {
        Action::SetCalendars(calendars) => next.calendars = calendars,
        Action::SetTaskGroups(groups) => next.task_groups = groups,
        Action::SetEvents(events) => next.events = events,
        Action::SetTasks(tasks) => next.tasks = tasks,
        Action::AddCalendar(calendar) => next.calendars.push(calendar),
        Action::UpdateCalendar(calendar) => {
            next.calendars = replace_by_id(&state.calendars, calendar, |item| &item.id);
        }
        Action::DeleteCalendar(id) => {
            next.calendars.retain(|calendar| calendar.id != id);
            next.events.retain(|event| event.calendar_id != id);
        }
        Action::AddTaskGroup(group) => next.task_groups.push(group),
        Action::UpdateTaskGroup(group) => {
            next.task_groups = replace_by_id(&state.task_groups, group, |item| &item.id);
        }
        Action::DeleteTaskGroup(id) => {
            next.task_groups.retain(|group| group.id != id);
            next.tasks
                .retain(|task| task.group_id.as_deref() != Some(id.as_str()));
        }
        Action::AddEvent(event) => next.events.push(event),
        Action::UpdateEvent(event) => {
            next.events = replace_by_id(&state.events, event, |item| &item.id);
        }
        Action::DeleteEvent(id) => next.events.retain(|event| event.id != id),
        Action::AddTask(task) => next.tasks.push(task),
        Action::UpdateTask(task) => {
            next.tasks = replace_by_id(&state.tasks, task, |item| &item.id);
        }
        Action::DeleteTask(id) => next.tasks.retain(|task| task.id != id),
    }
    next
}

/// Shared handle over [`StoreState`]. Every mutation goes through [`Store::dispatch`]
/// or [`Store::dispatch_all`].
#[derive(Debug, Default)]
pub struct Store {
    state: Mutex<StoreState>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: StoreState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|error| StoreError::Poisoned(error.to_string()))
    }

    pub fn dispatch(&self, action: Action) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        *state = reduce(&state, action);
        Ok(())
    }

    /// Applies `actions` in order under a single lock, so readers never see a
    /// state where only some of them have landed.
    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = Action>) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        *state = actions
            .into_iter()
            .fold(state.clone(), |current, action| reduce(&current, action));
        Ok(())
    }

    pub fn dispatch_json(&self, value: serde_json::Value) -> Result<(), StoreError> {
        let action = Action::from_json(value)?;
        self.dispatch(action)
    }

    pub fn snapshot(&self) -> Result<StoreState, StoreError> {
        Ok(self.lock()?.clone())
    }

    pub fn read<R>(&self, reader: impl FnOnce(&StoreState) -> R) -> Result<R, StoreError> {
        let state = self.lock()?;
        Ok(reader(&state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn calendar(id: &str) -> Calendar {
        Calendar {
            id: id.to_string(),
            title: format!("Calendar {id}"),
            color: "#4A90E2".to_string(),
        }
    }

    fn group(id: &str) -> TaskGroup {
        TaskGroup {
            id: id.to_string(),
            title: format!("Group {id}"),
            color: "#998419".to_string(),
        }
    }

    fn event(id: &str, calendar_id: &str) -> Event {
        Event {
            id: id.to_string(),
            title: format!("Event {id}"),
            start_date: "2025-09-10".to_string(),
            start_time: Some("10:00".to_string()),
            end_date: Some("2025-09-10".to_string()),
            end_time: Some("11:00".to_string()),
            all_day: false,
            calendar_id: calendar_id.to_string(),
            color: None,
            description: None,
        }
    }

    fn task(id: &str, group_id: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            start_date: Some("2025-09-12".to_string()),
            start_time: None,
            done: false,
            group_id: group_id.map(ToOwned::to_owned),
            color: None,
            repeat: false,
        }
    }

    #[test]
    fn update_replaces_only_matching_entry() {
        let state = StoreState {
            events: vec![event("1", "a"), event("2", "a")],
            ..StoreState::default()
        };
        let mut renamed = event("2", "a");
        renamed.title = "Renamed".to_string();

        let next = reduce(&state, Action::UpdateEvent(renamed.clone()));

        assert_eq!(next.events[0], state.events[0]);
        assert_eq!(next.events[1], renamed);
    }

    #[test]
    fn delete_calendar_cascades_to_events() {
        let state = StoreState {
            calendars: vec![calendar("a"), calendar("b")],
            events: vec![event("1", "a"), event("2", "b"), event("3", "a")],
            ..StoreState::default()
        };

        let next = reduce(&state, Action::DeleteCalendar("a".to_string()));

        assert_eq!(next.calendars, vec![calendar("b")]);
        assert_eq!(next.events, vec![event("2", "b")]);
    }

    #[test]
    fn delete_task_group_keeps_ungrouped_tasks() {
        let state = StoreState {
            task_groups: vec![group("g")],
            tasks: vec![task("1", Some("g")), task("2", None)],
            ..StoreState::default()
        };

        let next = reduce(&state, Action::DeleteTaskGroup("g".to_string()));

        assert!(next.task_groups.is_empty());
        assert_eq!(next.tasks, vec![task("2", None)]);
    }

    #[test]
    fn unknown_action_type_is_rejected_and_state_unchanged() {
        let store = Store::with_state(StoreState {
            calendars: vec![calendar("a")],
            ..StoreState::default()
        });
        let before = store.snapshot().expect("snapshot");

        let result = store.dispatch_json(serde_json::json!({ "type": "RENAME_EVERYTHING", "payload": [] }));

        assert_eq!(
            result,
            Err(StoreError::UnknownAction("RENAME_EVERYTHING".to_string()))
        );
        assert_eq!(store.snapshot().expect("snapshot"), before);
    }

    #[test]
    fn json_actions_use_wire_names() {
        let store = Store::new();
        store
            .dispatch_json(serde_json::json!({
                "type": "ADD_TASKGROUP",
                "payload": { "id": "9", "title": "Home", "color": "#998419" }
            }))
            .expect("add group");
        store
            .dispatch_json(serde_json::json!({ "type": "DELETE_TASKGROUP", "payload": "9" }))
            .expect("delete group");

        assert!(store.snapshot().expect("snapshot").task_groups.is_empty());
        assert_eq!(Action::DeleteTask("1".to_string()).type_name(), "DELETE_TASK");
    }

    #[test]
    fn malformed_payload_is_reported_with_action_type() {
        let store = Store::new();
        let result = store.dispatch_json(serde_json::json!({ "type": "ADD_EVENT", "payload": 42 }));
        match result {
            Err(StoreError::InvalidPayload(message)) => assert!(message.starts_with("ADD_EVENT")),
            other => panic!("expected invalid payload, got {other:?}"),
        }
    }

    #[test]
    fn batched_replacement_is_never_seen_half_applied() {
        let store = Store::new();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for size in 0..200usize {
                    let events = (0..size % 7).map(|index| event(&index.to_string(), "1")).collect();
                    let tasks = (0..size % 7).map(|index| task(&index.to_string(), None)).collect();
                    store
                        .dispatch_all([Action::SetEvents(events), Action::SetTasks(tasks)])
                        .expect("dispatch");
                }
            });
            scope.spawn(|| {
                for _ in 0..200 {
                    let (events, tasks) = store
                        .read(|state| (state.events.len(), state.tasks.len()))
                        .expect("read");
                    assert_eq!(events, tasks);
                }
            });
        });
    }

    #[test]
    fn calendar_items_take_owner_colors() {
        let state = StoreState {
            calendars: vec![calendar("a")],
            task_groups: vec![group("g")],
            events: vec![event("1", "a")],
            tasks: vec![task("2", Some("g")), task("3", None)],
        };
        let mut unscheduled = task("4", None);
        unscheduled.start_date = None;
        let state = reduce(&state, Action::AddTask(unscheduled));

        let items = state.calendar_items();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].color.as_deref(), Some("#4A90E2"));
        assert_eq!(items[1].color.as_deref(), Some("#998419"));
        assert_eq!(items[2].color, None);
    }

    fn id_strategy() -> impl Strategy<Value = String> {
        "[a-c]".prop_map(|value| value.to_string())
    }

    proptest! {
        #[test]
        fn no_event_of_deleted_calendar_survives(
            owners in proptest::collection::vec(id_strategy(), 0..20),
            deleted in id_strategy(),
        ) {
            let events = owners
                .iter()
                .enumerate()
                .map(|(index, owner)| event(&index.to_string(), owner))
                .collect::<Vec<_>>();
            let kept = events.iter().filter(|event| event.calendar_id != deleted).count();
            let state = StoreState { events, ..StoreState::default() };

            let next = reduce(&state, Action::DeleteCalendar(deleted.clone()));

            prop_assert!(next.events.iter().all(|event| event.calendar_id != deleted));
            prop_assert_eq!(next.events.len(), kept);
        }

        #[test]
        fn no_task_of_deleted_group_survives(
            owners in proptest::collection::vec(proptest::option::of(id_strategy()), 0..20),
            deleted in id_strategy(),
        ) {
            let tasks = owners
                .iter()
                .enumerate()
                .map(|(index, owner)| task(&index.to_string(), owner.as_deref()))
                .collect::<Vec<_>>();
            let state = StoreState { tasks, ..StoreState::default() };

            let next = reduce(&state, Action::DeleteTaskGroup(deleted.clone()));

            prop_assert!(next
                .tasks
                .iter()
                .all(|task| task.group_id.as_deref() != Some(deleted.as_str())));
        }
    }
}
