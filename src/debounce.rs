//! Debouncing of repeated requests to run the same background task.

use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use tokio::task::JoinHandle;

/// Runs a task once a burst of triggers has settled.
///
/// Each call to [Debouncer::trigger] cancels the previous task, whether it is
/// still waiting out the delay or already running, and schedules the new one
/// after the delay.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Create a debouncer that waits `delay` after the last trigger.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedule `task` to run after the delay, cancelling the previous task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.schedule(self.delay, task);
    }

    /// Start `task` right away, cancelling the previous task.
    ///
    /// The task still counts as pending, so the next trigger cancels it.
    pub fn trigger_now<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.schedule(Duration::ZERO, task);
    }

    fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);

        if let Some(previous) = previous {
            if !previous.is_finished() {
                tracing::debug!("Cancelling superseded task");
            }

            previous.abort();
        }
    }

    /// Cancel the pending task, if any.
    pub fn cancel(&self) {
        if let Some(pending) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
