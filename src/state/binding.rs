use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::task::{TaskStatus, TaskStore};
use crate::error::StreamError;
use crate::sse::TaskEvent;
use crate::stream::StreamObserver;

/// Stream observer that records a stream into one task of a shared store.
///
/// - connection start: task back to `Running`
/// - event: appended; `final_answer` and `execution_time` complete the task
/// - error: task fails and gets a synthetic `error` event
/// - close: a task still running is completed, flagged as implicit
#[derive(Debug, Clone)]
pub struct TaskObserver {
    store: Arc<Mutex<TaskStore>>,
    task_id: String,
}

impl TaskObserver {
    pub fn new(store: Arc<Mutex<TaskStore>>, task_id: impl Into<String>) -> Self {
        Self {
            store,
            task_id: task_id.into(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    fn store(&self) -> MutexGuard<'_, TaskStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StreamObserver for TaskObserver {
    fn on_connection_start(&self) {
        self.store().set_status(&self.task_id, TaskStatus::Running);
    }

    fn on_event(&self, event: TaskEvent) {
        let completes = matches!(
            event,
            TaskEvent::FinalAnswer { .. } | TaskEvent::ExecutionTime { .. }
        );
        let mut store = self.store();
        if !store.add_event(&self.task_id, event) {
            debug!("Dropping event for unknown task {}", self.task_id);
            return;
        }
        if completes {
            store.set_status(&self.task_id, TaskStatus::Completed);
        }
    }

    fn on_error(&self, error: &StreamError) {
        self.store()
            .add_event(&self.task_id, TaskEvent::error(error.user_message()));
    }

    fn on_close(&self) {
        if self.store().complete_implicitly(&self.task_id) {
            warn!(
                "Stream for task {} ended without a final answer; marking it completed",
                self.task_id
            );
        }
    }
}
