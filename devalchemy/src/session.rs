//! Shared, task-based access to an [`EditController`].
//!
//! Interactive callers should not block on a provider round-trip. The handle
//! runs each operation as a tokio task, serializes them behind one mutex and
//! publishes progress as a [`TaskState`] that a UI can watch (spinner,
//! disabled submit button, status line).

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::controller::{EditController, TransactionError};

/// Controller operation a task is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Backup,
    Restore,
    Edit,
    Review,
}

/// Observable state of the task that holds, or last held, the controller.
///
/// Tasks queued on the controller do not show up until they start running,
/// so states arrive in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Pending(Operation),
    Succeeded(Operation),
    Failed { operation: Operation, error: String },
}

impl TaskState {
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskState::Pending(_))
    }
}

type TaskResult<T> = JoinHandle<Result<T, TransactionError>>;

/// Cloneable handle to one controller.
///
/// At most one edit is in flight at a time; other operations queue on the
/// controller mutex and run after it.
#[derive(Clone)]
pub struct ControllerHandle {
    controller: Arc<Mutex<EditController>>,
    edit_in_flight: Arc<AtomicBool>,
    state: Arc<watch::Sender<TaskState>>,
}

/// Clears the in-flight flag even if the task is aborted mid-await.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Publishes `Pending` when a task starts running and a final state when it
/// ends. A task dropped before [`RunningTask::finish`] reports `Failed`.
struct RunningTask {
    operation: Operation,
    state: Arc<watch::Sender<TaskState>>,
    settled: bool,
}

impl RunningTask {
    fn start(operation: Operation, state: Arc<watch::Sender<TaskState>>) -> Self {
        publish(&state, TaskState::Pending(operation));
        Self {
            operation,
            state,
            settled: false,
        }
    }

    fn finish<T>(mut self, result: &Result<T, TransactionError>) {
        let next = match result {
            Ok(_) => TaskState::Succeeded(self.operation),
            Err(e) => TaskState::Failed {
                operation: self.operation,
                error: e.to_string(),
            },
        };
        publish(&self.state, next);
        self.settled = true;
    }
}

impl Drop for RunningTask {
    fn drop(&mut self) {
        if !self.settled {
            publish(
                &self.state,
                TaskState::Failed {
                    operation: self.operation,
                    error: "task aborted".to_string(),
                },
            );
        }
    }
}

impl ControllerHandle {
    pub fn new(controller: EditController) -> Self {
        let (state, _) = watch::channel(TaskState::Idle);
        Self {
            controller: Arc::new(Mutex::new(controller)),
            edit_in_flight: Arc::new(AtomicBool::new(false)),
            state: Arc::new(state),
        }
    }

    /// Whether an edit task has been spawned and not yet finished.
    pub fn is_edit_in_progress(&self) -> bool {
        self.edit_in_flight.load(Ordering::Acquire)
    }

    pub fn state(&self) -> TaskState {
        self.state.borrow().clone()
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    /// Snapshot of the controller's in-memory content.
    pub async fn content(&self) -> Option<String> {
        self.controller.lock().await.content().map(str::to_string)
    }

    /// Start an edit in the background.
    ///
    /// Returns [`TransactionError::Busy`] without spawning anything when an
    /// edit is already running.
    pub fn spawn_edit(&self, instruction: impl Into<String>) -> Result<TaskResult<String>, TransactionError> {
        if self
            .edit_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TransactionError::Busy);
        }
        let guard = InFlightGuard(self.edit_in_flight.clone());
        let instruction = instruction.into();
        let controller = self.controller.clone();
        let state = self.state.clone();

        Ok(tokio::spawn(async move {
            let _guard = guard;
            let mut ctl = controller.lock().await;
            let task = RunningTask::start(Operation::Edit, state);
            let result = ctl.apply_edit(&instruction).await;
            task.finish(&result);
            result
        }))
    }

    pub fn spawn_review(&self) -> TaskResult<String> {
        let controller = self.controller.clone();
        let state = self.state.clone();

        tokio::spawn(async move {
            let mut ctl = controller.lock().await;
            let task = RunningTask::start(Operation::Review, state);
            let result = ctl.review().await;
            task.finish(&result);
            result
        })
    }

    pub fn spawn_load(&self, path: impl Into<PathBuf>) -> TaskResult<String> {
        let path = path.into();
        let controller = self.controller.clone();
        let state = self.state.clone();

        tokio::spawn(async move {
            let mut ctl = controller.lock().await;
            let task = RunningTask::start(Operation::Load, state);
            let result = ctl.load(&path).map(str::to_string);
            task.finish(&result);
            result
        })
    }

    pub fn spawn_backup(&self) -> TaskResult<()> {
        let controller = self.controller.clone();
        let state = self.state.clone();

        tokio::spawn(async move {
            let mut ctl = controller.lock().await;
            let task = RunningTask::start(Operation::Backup, state);
            let result = ctl.backup();
            task.finish(&result);
            result
        })
    }

    pub fn spawn_restore(&self) -> TaskResult<String> {
        let controller = self.controller.clone();
        let state = self.state.clone();

        tokio::spawn(async move {
            let mut ctl = controller.lock().await;
            let task = RunningTask::start(Operation::Restore, state);
            let result = ctl.restore();
            task.finish(&result);
            result
        })
    }
}

/// Await a spawned task, folding a panic or cancellation into the error type.
pub async fn join_task<T>(task: TaskResult<T>) -> Result<T, TransactionError> {
    task.await
        .map_err(|e| TransactionError::TaskAborted(e.to_string()))?
}

fn publish(state: &watch::Sender<TaskState>, next: TaskState) {
    debug!(state = ?next, "task state");
    state.send_replace(next);
}
