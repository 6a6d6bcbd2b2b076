//! Caller-owned container for query tasks and their events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sse::TaskEvent;

/// Task status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Running,
    Waiting,
    /// A terminal event arrived
    Stopped,
    Completed,
    Error,
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            TaskStatus::Stopped | TaskStatus::Completed | TaskStatus::Error
        )
    }
}

/// One submitted query and everything the agent reported for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub query: String,
    pub events: Vec<TaskEvent>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    /// Set when the stream ended without a terminal event while the task was
    /// still running, and the task was marked completed anyway.
    #[serde(default)]
    pub completed_implicitly: bool,
}

impl Task {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query: query.into(),
            events: Vec::new(),
            status: TaskStatus::Running,
            created_at: Utc::now(),
            completed_implicitly: false,
        }
    }

    /// The answer, if a `final_answer` event arrived.
    pub fn final_answer(&self) -> Option<&str> {
        self.events.iter().find_map(|event| match event {
            TaskEvent::FinalAnswer { answer, .. } => Some(answer.as_str()),
            _ => None,
        })
    }

    /// Reported execution time in seconds, if any.
    pub fn execution_time(&self) -> Option<f64> {
        self.events.iter().find_map(|event| match event {
            TaskEvent::ExecutionTime { time } => Some(*time),
            _ => None,
        })
    }
}

/// Tasks in creation order, plus which one is current.
///
/// Created and owned by the caller; share it behind a lock when a stream
/// observer needs to update it.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    current: Option<String>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a running task for `query` and make it current. Returns its id.
    pub fn create_task(&mut self, query: impl Into<String>) -> String {
        let task = Task::new(query);
        let id = task.id.clone();
        self.tasks.push(task);
        self.current = Some(id.clone());
        id
    }

    /// Append an event to a task.
    ///
    /// `error` events move the task to `Error`; `final_answer` and
    /// `execution_time` move it to `Stopped`. Returns false for an unknown id.
    pub fn add_event(&mut self, id: &str, event: TaskEvent) -> bool {
        let Some(task) = self.get_mut(id) else {
            return false;
        };
        match &event {
            TaskEvent::Error { .. } => task.status = TaskStatus::Error,
            TaskEvent::FinalAnswer { .. } | TaskEvent::ExecutionTime { .. } => {
                task.status = TaskStatus::Stopped
            }
            TaskEvent::Step { .. } => {}
        }
        task.events.push(event);
        true
    }

    /// Returns false for an unknown id.
    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.status = status;
                true
            }
            None => false,
        }
    }

    /// Mark a still-running task completed because its stream ended.
    ///
    /// Returns true if the task was running and got marked.
    pub fn complete_implicitly(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(task) if task.status == TaskStatus::Running => {
                task.status = TaskStatus::Completed;
                task.completed_implicitly = true;
                true
            }
            _ => false,
        }
    }

    /// Select the current task. `None` clears the selection. Returns false for
    /// an unknown id.
    pub fn set_current(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if self.get(id).is_none() => false,
            _ => {
                self.current = id.map(str::to_string);
                true
            }
        }
    }

    pub fn current(&self) -> Option<&Task> {
        self.current.as_deref().and_then(|id| self.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drop every task and the current selection.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.current = None;
    }
}
