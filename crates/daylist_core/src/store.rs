use crate::error::AppError;
use crate::model::{Section, Statistics, Task};
use crate::storage::KeyValueStore;
use serde_json::Value;
use std::collections::HashSet;
use time::OffsetDateTime;
use tracing::{debug, warn};

pub const TASKS_KEY: &str = "tasks";
pub const NOTES_KEY: &str = "notes";

/// Where the task list came from on the last `load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TasksSource {
    /// No stored value; the built-in seed tasks are in use.
    Seed,
    Stored,
    /// A stored value existed but could not be used; prior state was kept.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub tasks_source: TasksSource,
    pub dropped: usize,
    pub notes_loaded: bool,
}

pub fn seed_tasks() -> Vec<Task> {
    vec![
        Task {
            id: 1,
            text: "read a book".to_string(),
            completed: false,
            section: Section::Today,
        },
        Task {
            id: 2,
            text: "do homework".to_string(),
            completed: true,
            section: Section::Today,
        },
    ]
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// In-memory task list and notes, mirrored to a key-value backend.
///
/// Every mutation that changes the task list writes the whole list back under
/// [`TASKS_KEY`]; notes are written independently under [`NOTES_KEY`].
pub struct TaskStore<S> {
    backend: S,
    tasks: Vec<Task>,
    notes: String,
    last_id: i64,
    clock: fn() -> i64,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_clock(backend, now_millis)
    }

    pub fn with_clock(backend: S, clock: fn() -> i64) -> Self {
        Self {
            backend,
            tasks: seed_tasks(),
            notes: String::new(),
            last_id: 0,
            clock,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn find(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn tasks_in(&self, section: Section) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.section == section)
            .collect()
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_tasks(&self.tasks)
    }

    pub fn load(&mut self) -> Result<LoadReport, AppError> {
        let mut report = LoadReport {
            tasks_source: TasksSource::Seed,
            dropped: 0,
            notes_loaded: false,
        };

        match self.backend.get(TASKS_KEY) {
            Ok(Some(raw)) => match decode_tasks(&raw) {
                Ok((tasks, dropped)) => {
                    self.tasks = tasks;
                    report.tasks_source = TasksSource::Stored;
                    report.dropped = dropped;
                }
                Err(err) => {
                    warn!(error = %err, "stored tasks unreadable, keeping current list");
                    report.tasks_source = TasksSource::Fallback;
                }
            },
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "tasks key unreadable, keeping current list");
                report.tasks_source = TasksSource::Fallback;
            }
        }

        if let Some(notes) = self.backend.get(NOTES_KEY)? {
            self.notes = notes;
            report.notes_loaded = true;
        }

        debug!(
            tasks = self.tasks.len(),
            source = ?report.tasks_source,
            dropped = report.dropped,
            "loaded state"
        );
        Ok(report)
    }

    pub fn persist(&mut self) -> Result<(), AppError> {
        let encoded = serde_json::to_string(&self.tasks)?;
        self.backend.set(TASKS_KEY, &encoded)
    }

    /// Appends a task unless `text` is blank, in which case nothing happens.
    pub fn add_task(&mut self, text: &str, section: Section) -> Result<Option<Task>, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let task = Task {
            id: self.next_id(),
            text: trimmed.to_string(),
            completed: false,
            section,
        };

        self.tasks.push(task.clone());
        self.persist()?;
        debug!(id = task.id, section = %section, "added task");

        Ok(Some(task))
    }

    pub fn toggle_task(&mut self, id: i64) -> Result<Option<Task>, AppError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(None);
        };

        task.completed = !task.completed;
        let toggled = task.clone();
        self.persist()?;
        debug!(id, completed = toggled.completed, "toggled task");

        Ok(Some(toggled))
    }

    /// Removes every task carrying `id` and returns what was removed.
    pub fn delete_task(&mut self, id: i64) -> Result<Vec<Task>, AppError> {
        let (removed, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| task.id == id);
        self.tasks = kept;

        if !removed.is_empty() {
            self.persist()?;
            debug!(id, removed = removed.len(), "deleted task");
        }

        Ok(removed)
    }

    pub fn save_notes(&mut self, value: &str) -> Result<(), AppError> {
        self.notes = value.to_string();
        self.backend.set(NOTES_KEY, value)?;
        debug!(len = value.len(), "saved notes");
        Ok(())
    }

    fn next_id(&mut self) -> i64 {
        let highest = self
            .tasks
            .iter()
            .map(|task| task.id)
            .max()
            .unwrap_or(0)
            .max(self.last_id);
        let id = match highest.checked_add(1) {
            Some(next) => (self.clock)().max(next),
            None => {
                warn!("task ids exhausted upward, reusing the lowest free id");
                self.lowest_free_id()
            }
        };
        self.last_id = id;
        id
    }

    fn lowest_free_id(&self) -> i64 {
        let taken: HashSet<i64> = self.tasks.iter().map(|task| task.id).collect();
        (1..=i64::MAX)
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or(0)
    }
}

/// Decodes the stored task list record by record.
///
/// The value must be a JSON array. Records that don't decode, have blank text
/// or repeat an earlier id are dropped; the count of dropped records is
/// returned alongside the kept ones.
fn decode_tasks(raw: &str) -> Result<(Vec<Task>, usize), AppError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Array(records) = value else {
        return Err(AppError::invalid_data("tasks must be a JSON array"));
    };

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for (index, record) in records.into_iter().enumerate() {
        let task: Task = match serde_json::from_value(record) {
            Ok(task) => task,
            Err(err) => {
                warn!(index, error = %err, "dropping malformed task record");
                dropped += 1;
                continue;
            }
        };

        if task.text.trim().is_empty() {
            warn!(index, id = task.id, "dropping task record with blank text");
            dropped += 1;
            continue;
        }

        if !seen.insert(task.id) {
            warn!(index, id = task.id, "dropping task record with duplicate id");
            dropped += 1;
            continue;
        }

        tasks.push(task);
    }

    Ok((tasks, dropped))
}
