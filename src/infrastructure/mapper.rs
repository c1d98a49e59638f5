use crate::domain::models::{Calendar, Event, Task, TaskGroup};
use crate::domain::schedule::{DEFAULT_TIME, split_date_time};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::wire::{
    EventPayload, GroupPayload, TaskPayload, WireEvent, WireGroup, WireId, WireTask,
};

const MIDNIGHT: &str = "00:00";

pub fn event_from_wire(event: &WireEvent) -> Result<Event, InfraError> {
    let id = non_empty_id(&event.id, "event")?;
    let (start_date, start_time) = split_date_time(&event.start_date).ok_or_else(|| {
        InfraError::Payload(format!(
            "event {id} has invalid start_date '{}'",
            event.start_date
        ))
    })?;
    let (end_date, end_time) = match event.end_date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            let (date, time) = split_date_time(raw).ok_or_else(|| {
                InfraError::Payload(format!("event {id} has invalid end_date '{raw}'"))
            })?;
            (Some(date), time)
        }
        _ => (None, None),
    };
    let calendar_id = event
        .calendar_id
        .as_ref()
        .map(ToString::to_string)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| InfraError::Payload(format!("event {id} has no calendar_id")))?;

    Ok(Event {
        id,
        title: event.title.trim().to_string(),
        start_date,
        start_time,
        end_date,
        end_time,
        all_day: false,
        calendar_id,
        color: non_empty(event.color.as_deref()),
        description: non_empty(event.description.as_deref()),
    })
}

pub fn task_from_wire(task: &WireTask) -> Result<Task, InfraError> {
    let id = non_empty_id(&task.id, "task")?;
    let (start_date, start_time) = match task.date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match split_date_time(raw) {
            Some((date, time)) => (Some(date), time.filter(|value| value != MIDNIGHT)),
            None => {
                return Err(InfraError::Payload(format!(
                    "task {id} has invalid date '{raw}'"
                )));
            }
        },
        _ => (None, None),
    };

    Ok(Task {
        id,
        title: task.title.trim().to_string(),
        start_date,
        start_time,
        done: task.status.unwrap_or(false),
        group_id: task
            .task_group_id
            .as_ref()
            .map(ToString::to_string)
            .filter(|value| !value.is_empty()),
        color: non_empty(task.color.as_deref()),
        repeat: task.recurrencia.is_some_and(|value| value != 0),
    })
}

pub fn calendar_from_wire(group: &WireGroup) -> Result<Calendar, InfraError> {
    let calendar = Calendar {
        id: non_empty_id(&group.id, "calendar")?,
        title: group.title.trim().to_string(),
        color: group.color.as_deref().unwrap_or_default().trim().to_string(),
    };
    calendar.validate().map_err(InfraError::Payload)?;
    Ok(calendar)
}

pub fn task_group_from_wire(group: &WireGroup) -> Result<TaskGroup, InfraError> {
    let task_group = TaskGroup {
        id: non_empty_id(&group.id, "task group")?,
        title: group.title.trim().to_string(),
        color: group.color.as_deref().unwrap_or_default().trim().to_string(),
    };
    task_group.validate().map_err(InfraError::Payload)?;
    Ok(task_group)
}

pub fn events_from_wire(events: &[WireEvent]) -> Result<Vec<Event>, InfraError> {
    events.iter().map(event_from_wire).collect()
}

pub fn tasks_from_wire(tasks: &[WireTask]) -> Result<Vec<Task>, InfraError> {
    tasks.iter().map(task_from_wire).collect()
}

/// Coerces a store id back to the numeric key the backend expects.
pub fn numeric_id(value: &str, field: &str) -> Result<i64, InfraError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| InfraError::Validation(format!("{field} must be numeric, got '{value}'")))
}

/// Builds the full-form write body for `event`; dates are sent as local
/// `YYYY-MM-DDTHH:MM`. Color and description are always present so a cleared
/// field reaches the backend as `""`.
pub fn event_payload(event: &Event) -> Result<EventPayload, InfraError> {
    let start_time = if event.all_day { None } else { event.start_time.as_deref() };
    let end_time = if event.all_day { None } else { event.end_time.as_deref() };
    Ok(EventPayload {
        title: Some(event.title.trim().to_string()),
        start_date: Some(date_time(&event.start_date, start_time)),
        end_date: event
            .end_date
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(|date| date_time(date, end_time)),
        calendar_id: Some(numeric_id(&event.calendar_id, "calendar_id")?),
        color: Some(cleared_or_trimmed(event.color.as_deref())),
        description: Some(cleared_or_trimmed(event.description.as_deref())),
    })
}

pub fn task_payload(task: &Task) -> Result<TaskPayload, InfraError> {
    let task_group_id = match task.group_id.as_deref().map(str::trim) {
        Some(group_id) if !group_id.is_empty() => Some(numeric_id(group_id, "task_group_id")?),
        _ => None,
    };
    Ok(TaskPayload {
        title: Some(task.title.trim().to_string()),
        date: task.wire_date(),
        task_group_id,
        status: Some(task.done),
        color: Some(cleared_or_trimmed(task.color.as_deref())),
    })
}

pub fn group_payload(title: &str, color: &str) -> GroupPayload {
    GroupPayload {
        title: Some(title.trim().to_string()),
        color: Some(color.trim().to_string()),
    }
}

fn date_time(date: &str, time: Option<&str>) -> String {
    let time = time
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_TIME);
    format!("{}T{time}", date.trim())
}

fn cleared_or_trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn non_empty_id(id: &WireId, kind: &str) -> Result<String, InfraError> {
    let id = id.to_string();
    if id.is_empty() {
        return Err(InfraError::Payload(format!("{kind} record without id")));
    }
    Ok(id)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}
