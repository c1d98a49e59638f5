use crate::domain::schedule::to_local_canonical;
use crate::domain::store::{Action, Store, StoreError};
use crate::infrastructure::api_client::AgendaApi;
use crate::infrastructure::command_log::CommandLog;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::mapper::{events_from_wire, tasks_from_wire};
use crate::infrastructure::wire::RangeQuery;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

const COMMAND: &str = "sync_range";

/// Window the calendar grid currently shows, as reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl VisibleRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn query(&self, time_zone: Tz) -> RangeQuery {
        RangeQuery::between(
            to_local_canonical(self.start, time_zone),
            to_local_canonical(self.end, time_zone),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSyncOutcome {
    /// No mounted view, nothing fetched.
    Skipped,
    Applied { events: usize, tasks: usize },
    /// A newer navigation started while this one was in flight.
    Superseded,
    /// The fetch failed and both collections were reset to empty.
    Failed(String),
}

/// Refetches events and tasks whenever the visible window changes.
pub struct RangeSynchronizer<A>
where
    A: AgendaApi + ?Sized,
{
    api: Arc<A>,
    store: Arc<Store>,
    log: Arc<CommandLog>,
    time_zone: Tz,
    generation: AtomicU64,
}

impl<A> RangeSynchronizer<A>
where
    A: AgendaApi + ?Sized,
{
    pub fn new(api: Arc<A>, store: Arc<Store>, log: Arc<CommandLog>) -> Self {
        Self {
            api,
            store,
            log,
            time_zone: Tz::UTC,
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Called on every `datesSet` notification from the grid.
    pub async fn sync(&self, range: Option<VisibleRange>) -> Result<RangeSyncOutcome, StoreError> {
        let Some(range) = range.filter(|range| range.end > range.start) else {
            return Ok(RangeSyncOutcome::Skipped);
        };

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = range.query(self.time_zone);
        let (events, tasks) = tokio::join!(self.api.list_events(&query), self.api.list_tasks(&query));

        if self.generation.load(Ordering::SeqCst) != token {
            self.log.info(
                COMMAND,
                &format!(
                    "discarded superseded range {}..{}",
                    query.start.as_deref().unwrap_or_default(),
                    query.end.as_deref().unwrap_or_default()
                ),
            );
            return Ok(RangeSyncOutcome::Superseded);
        }

        let mapped = events
            .and_then(|events| events_from_wire(&events))
            .and_then(|events| {
                tasks
                    .and_then(|tasks| tasks_from_wire(&tasks))
                    .map(|tasks| (events, tasks))
            });

        match mapped {
            Ok((events, tasks)) => {
                let counts = (events.len(), tasks.len());
                self.store
                    .dispatch_all([Action::SetEvents(events), Action::SetTasks(tasks)])?;
                self.log.info(
                    COMMAND,
                    &format!(
                        "loaded {} events and {} tasks for {}..{}",
                        counts.0,
                        counts.1,
                        query.start.as_deref().unwrap_or_default(),
                        query.end.as_deref().unwrap_or_default()
                    ),
                );
                Ok(RangeSyncOutcome::Applied {
                    events: counts.0,
                    tasks: counts.1,
                })
            }
            Err(error) => self.reset(&error),
        }
    }

    fn reset(&self, error: &InfraError) -> Result<RangeSyncOutcome, StoreError> {
        self.store
            .dispatch_all([Action::SetEvents(Vec::new()), Action::SetTasks(Vec::new())])?;
        self.log.error(COMMAND, &error.to_string());
        Ok(RangeSyncOutcome::Failed(error.to_string()))
    }
}
