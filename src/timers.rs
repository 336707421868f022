use crate::{
    config::Saveable,
    error::TimerError,
    time::{self, elapsed_seconds},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

const TIMERS_FILENAME: &str = "timers.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    #[serde(with = "time::timestamp")]
    pub started_at: DateTime<Utc>,
}

/// Every running timer, keyed by task name
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timers(pub HashMap<String, TimerRecord>);

impl Saveable for Timers {
    fn path(root: &Path) -> PathBuf {
        root.join(TIMERS_FILENAME)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedTimer {
    pub task: String,
    #[serde(with = "time::timestamp")]
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedTimer {
    pub task: String,
    #[serde(with = "time::timestamp")]
    pub started_at: DateTime<Utc>,
    #[serde(with = "time::timestamp")]
    pub stopped_at: DateTime<Utc>,
    pub elapsed_seconds: i64,
}

/// File backed timer store. Every call reloads the file; mutations write it back before returning.
#[derive(Debug, Clone)]
pub struct TimerStore {
    root: PathBuf,
}

impl TimerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> PathBuf {
        Timers::path(&self.root)
    }

    pub fn load(&self) -> Timers {
        Timers::load(&self.root)
    }

    pub fn save(&self, timers: &Timers) -> Result<(), TimerError> {
        timers.save(&self.root)
    }

    pub fn start(&self, task: &str) -> Result<StartedTimer, TimerError> {
        self.start_at(task, time::now())
    }

    /// Starts (or restarts) the timer for `task`, discarding any earlier start
    #[instrument(level = "trace", skip(self))]
    pub fn start_at(&self, task: &str, now: DateTime<Utc>) -> Result<StartedTimer, TimerError> {
        let mut timers = self.load();

        if let Some(previous) = timers.0.insert(task.to_owned(), TimerRecord { started_at: now }) {
            debug!(
                "Overwriting timer for {task} started at {}",
                time::format_timestamp(&previous.started_at)
            );
        }
        self.save(&timers)?;

        Ok(StartedTimer {
            task: task.to_owned(),
            started_at: now,
        })
    }

    pub fn stop(&self, task: &str) -> Result<Option<StoppedTimer>, TimerError> {
        self.stop_at(task, time::now())
    }

    /// Stops the timer for `task`, `None` if none is running. The store is only written when one was.
    #[instrument(level = "trace", skip(self))]
    pub fn stop_at(
        &self,
        task: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<StoppedTimer>, TimerError> {
        let mut timers = self.load();

        let Some(record) = timers.0.remove(task) else {
            debug!("No running timer for {task}");
            return Ok(None);
        };
        self.save(&timers)?;

        Ok(Some(StoppedTimer {
            task: task.to_owned(),
            started_at: record.started_at,
            stopped_at: now,
            elapsed_seconds: elapsed_seconds(&record.started_at, &now),
        }))
    }

    /// Running timers ordered by task name
    pub fn running(&self) -> Vec<StartedTimer> {
        let mut running: Vec<_> = self
            .load()
            .0
            .into_iter()
            .map(|(task, record)| StartedTimer {
                task,
                started_at: record.started_at,
            })
            .collect();
        running.sort_by(|a, b| a.task.cmp(&b.task));

        running
    }
}
