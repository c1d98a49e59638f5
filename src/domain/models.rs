use crate::domain::schedule;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Calendar {
    pub id: String,
    pub title: String,
    pub color: String,
}

impl Calendar {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "calendar.id")?;
        validate_non_empty(&self.title, "calendar.title")?;
        validate_hex_color(&self.color, "calendar.color")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskGroup {
    pub id: String,
    pub title: String,
    pub color: String,
}

impl TaskGroup {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "task_group.id")?;
        validate_non_empty(&self.title, "task_group.title")?;
        validate_hex_color(&self.color, "task_group.color")
    }
}

/// A timed or all-day entry owned by a [`Calendar`].
///
/// Dates are kept as `YYYY-MM-DD` and times as `HH:MM`, split the way the
/// popover form edits them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start_date: String,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub all_day: bool,
    pub calendar_id: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl Event {
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        let time = if self.all_day { None } else { self.start_time.as_deref() };
        schedule::combine(&self.start_date, time)
    }

    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        let date = self.end_date.as_deref()?;
        let time = if self.all_day { None } else { self.end_time.as_deref() };
        schedule::combine(date, time)
    }
}

/// A to-do item, optionally scheduled on a day. Tasks never have a duration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub done: bool,
    pub group_id: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub repeat: bool,
}

impl Task {
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        let date = self.start_date.as_deref()?;
        schedule::combine(date, self.start_time.as_deref())
    }

    /// The date value as the backend stores it: `YYYY-MM-DDTHH:MM` when a
    /// time is known, the bare date otherwise.
    pub fn wire_date(&self) -> Option<String> {
        let date = self
            .start_date
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())?;
        match self
            .start_time
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            Some(time) => Some(format!("{date}T{time}")),
            None => Some(date.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Event,
    Task,
}

/// Form state of the event popover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub id: Option<String>,
    pub title: String,
    pub all_day: bool,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub calendar_id: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl EventDraft {
    pub fn for_date(date: &str) -> Self {
        Self {
            id: None,
            title: String::new(),
            all_day: true,
            start_date: date.to_string(),
            start_time: DEFAULT_START_TIME.to_string(),
            end_date: date.to_string(),
            end_time: DEFAULT_END_TIME.to_string(),
            calendar_id: None,
            color: None,
            description: None,
        }
    }

    pub fn from_event(event: &Event) -> Self {
        Self {
            id: Some(event.id.clone()),
            title: event.title.clone(),
            all_day: event.all_day,
            start_date: event.start_date.clone(),
            start_time: event
                .start_time
                .clone()
                .unwrap_or_else(|| DEFAULT_START_TIME.to_string()),
            end_date: event.end_date.clone().unwrap_or_default(),
            end_time: event
                .end_time
                .clone()
                .unwrap_or_else(|| DEFAULT_END_TIME.to_string()),
            calendar_id: Some(event.calendar_id.clone()),
            color: event.color.clone(),
            description: event.description.clone(),
        }
    }
}

/// Form state of the task popover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub id: Option<String>,
    pub title: String,
    pub start_date: String,
    pub start_time: String,
    pub group_id: Option<String>,
    pub done: bool,
    pub color: Option<String>,
}

impl TaskDraft {
    pub fn for_date(date: &str) -> Self {
        Self {
            id: None,
            title: String::new(),
            start_date: date.to_string(),
            start_time: String::new(),
            group_id: None,
            done: false,
            color: None,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            id: Some(task.id.clone()),
            title: task.title.clone(),
            start_date: task.start_date.clone().unwrap_or_default(),
            start_time: task.start_time.clone().unwrap_or_default(),
            group_id: task.group_id.clone(),
            done: task.done,
            color: task.color.clone(),
        }
    }
}

const DEFAULT_START_TIME: &str = "09:00";
const DEFAULT_END_TIME: &str = "10:00";

/// An item as the calendar grid draws it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarItem {
    pub id: String,
    pub kind: ItemKind,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
    pub color: Option<String>,
    pub done: Option<bool>,
    pub duration_editable: bool,
}

impl CalendarItem {
    pub fn from_event(event: &Event, calendar_color: Option<&str>) -> Option<Self> {
        Some(Self {
            id: event.id.clone(),
            kind: ItemKind::Event,
            title: event.title.clone(),
            start: event.starts_at()?,
            end: event.ends_at(),
            all_day: event.all_day,
            color: calendar_color
                .map(ToOwned::to_owned)
                .or_else(|| event.color.clone()),
            done: None,
            duration_editable: true,
        })
    }

    pub fn from_task(task: &Task, group_color: Option<&str>) -> Option<Self> {
        Some(Self {
            id: task.id.clone(),
            kind: ItemKind::Task,
            title: task.title.clone(),
            start: task.scheduled_at()?,
            end: None,
            all_day: true,
            color: group_color
                .map(ToOwned::to_owned)
                .or_else(|| task.color.clone()),
            done: Some(task.done),
            duration_editable: false,
        })
    }
}

pub fn validate_non_empty(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

pub fn validate_hex_color(value: &str, field: &str) -> Result<(), String> {
    let value = value.trim();
    let Some(digits) = value.strip_prefix('#') else {
        return Err(format!("{field} must start with '#': {value}"));
    };
    if digits.is_empty() || digits.len() > 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("{field} must be a hex color like #RRGGBB: {value}"));
    }
    Ok(())
}
