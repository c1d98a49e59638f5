use crate::domain::models::Task;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardSection {
    Overdue,
    Dated,
    Undated,
}

/// Which sections of the task board are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskBoardFilters {
    pub overdue: bool,
    pub dated: bool,
    pub undated: bool,
}

impl Default for TaskBoardFilters {
    fn default() -> Self {
        Self::all()
    }
}

impl TaskBoardFilters {
    pub fn all() -> Self {
        Self {
            overdue: true,
            dated: true,
            undated: true,
        }
    }

    pub fn none() -> Self {
        Self {
            overdue: false,
            dated: false,
            undated: false,
        }
    }

    pub fn toggle(&mut self, section: BoardSection) {
        match section {
            BoardSection::Overdue => self.overdue = !self.overdue,
            BoardSection::Dated => self.dated = !self.dated,
            BoardSection::Undated => self.undated = !self.undated,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.overdue && !self.dated && !self.undated
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBoard {
    pub overdue: Vec<Task>,
    pub dated: BTreeMap<NaiveDate, Vec<Task>>,
    pub undated: Vec<Task>,
}

impl TaskBoard {
    pub fn count(&self, section: BoardSection) -> usize {
        match section {
            BoardSection::Overdue => self.overdue.len(),
            BoardSection::Dated => self.dated.values().map(Vec::len).sum(),
            BoardSection::Undated => self.undated.len(),
        }
    }
}

/// Splits tasks into overdue, per-day and undated sections.
///
/// A task is overdue when it is dated before `now` and still open. Completed
/// past tasks stay under their day. Unparseable dates count as undated.
pub fn categorize_tasks(tasks: &[Task], now: NaiveDateTime, filters: TaskBoardFilters) -> TaskBoard {
    let mut board = TaskBoard::default();
    for task in tasks {
        match task.scheduled_at() {
            Some(at) if at < now && !task.done => {
                if filters.overdue {
                    board.overdue.push(task.clone());
                }
            }
            Some(at) => {
                if filters.dated {
                    board.dated.entry(at.date()).or_default().push(task.clone());
                }
            }
            None => {
                if filters.undated {
                    board.undated.push(task.clone());
                }
            }
        }
    }
    board
}
