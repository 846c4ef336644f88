//! Where mediations run once the webhook has been acknowledged.

use std::sync::{Mutex, PoisonError};

use futures::future::BoxFuture;

/// A detached unit of work.
pub type Task = BoxFuture<'static, ()>;

pub trait TaskExecutor: Send + Sync {
    fn submit(&self, task: Task);
}

/// Runs every task on the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioExecutor;

impl TaskExecutor for TokioExecutor {
    fn submit(&self, task: Task) {
        tokio::spawn(task);
    }
}

/// Holds tasks until [`QueuedExecutor::run_pending`] drives them, in submission order.
#[derive(Default)]
pub struct QueuedExecutor {
    queue: Mutex<Vec<Task>>,
}

impl QueuedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Awaits every queued task one after another; returns how many ran.
    pub async fn run_pending(&self) -> usize {
        let tasks = std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner));
        let count = tasks.len();
        for task in tasks {
            task.await;
        }
        count
    }
}

impl TaskExecutor for QueuedExecutor {
    fn submit(&self, task: Task) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task);
    }
}
