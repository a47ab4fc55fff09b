//! Task completion and the caller's handle to it.
//!
//! A task's outcome travels through a `oneshot` channel. The sending half
//! sits in a slot shared by the engine (which completes the task) and the
//! [`TaskHandle`] (which may cancel it). Whoever takes the sender first
//! decides the outcome; everyone after that gets `false`.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::TaskError;

type Outcome<O> = Result<O, TaskError>;

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// The set-once result slot of one task.
pub(crate) struct Completion<O> {
    slot: Arc<Mutex<Option<oneshot::Sender<Outcome<O>>>>>,
}

impl<O> Clone for Completion<O> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<O> Completion<O> {
    pub(crate) fn new() -> (Self, oneshot::Receiver<Outcome<O>>) {
        let (tx, rx) = oneshot::channel();
        let completion = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (completion, rx)
    }

    /// Resolves the slot with `outcome`. Returns `false` if it was already
    /// resolved.
    pub(crate) fn resolve(&self, outcome: Outcome<O>) -> bool {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(sender) => {
                // The handle may already be gone; the task still counts as
                // finished.
                let _ = sender.send(outcome);
                true
            }
            None => false,
        }
    }

    pub(crate) fn complete(&self, value: O) -> bool {
        self.resolve(Ok(value))
    }

    pub(crate) fn fail(&self, error: TaskError) -> bool {
        self.resolve(Err(error))
    }

    pub(crate) fn is_done(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

// ---------------------------------------------------------------------------
// TaskHandle
// ---------------------------------------------------------------------------

/// The caller's side of an executing task.
///
/// Dropping the handle does not cancel the task; it keeps running until
/// it completes or the interceptor is dropped.
pub struct TaskHandle<O> {
    completion: Completion<O>,
    receiver: oneshot::Receiver<Outcome<O>>,
    timeout: Option<Duration>,
}

impl<O> TaskHandle<O> {
    pub(crate) fn new(
        completion: Completion<O>,
        receiver: oneshot::Receiver<Outcome<O>>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            completion,
            receiver,
            timeout,
        }
    }

    /// Cancels the task if it has not completed yet.
    ///
    /// Returns `true` if this call decided the outcome. The interceptor
    /// drops the task's subscriptions before its next dispatch.
    pub fn cancel(&self) -> bool {
        let cancelled = self.completion.fail(TaskError::Cancelled);
        if cancelled {
            tracing::debug!("task cancelled by handle");
        }
        cancelled
    }

    /// Returns `true` once the task has an outcome, whatever it is.
    pub fn is_finished(&self) -> bool {
        self.completion.is_done()
    }

    /// Waits for the outcome, applying the interceptor's configured task
    /// timeout if there is one.
    pub async fn result(self) -> Result<O, TaskError> {
        match self.timeout {
            Some(limit) => self.result_within(limit).await,
            None => self.receiver.await.unwrap_or(Err(TaskError::Detached)),
        }
    }

    /// Waits at most `limit` for the outcome, then cancels the task.
    ///
    /// If the task completes in the window between the deadline and the
    /// cancel, its real outcome is returned.
    pub async fn result_within(self, limit: Duration) -> Result<O, TaskError> {
        let Self {
            completion,
            mut receiver,
            ..
        } = self;

        if let Ok(outcome) = tokio::time::timeout(limit, &mut receiver).await {
            return outcome.unwrap_or(Err(TaskError::Detached));
        }
        if completion.fail(TaskError::Cancelled) {
            tracing::debug!(?limit, "task timed out");
        }
        receiver.await.unwrap_or(Err(TaskError::Detached))
    }
}

impl<O> std::fmt::Debug for TaskHandle<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("finished", &self.is_finished())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> (Completion<u32>, TaskHandle<u32>) {
        let (completion, rx) = Completion::new();
        (completion.clone(), TaskHandle::new(completion, rx, None))
    }

    #[test]
    fn test_completion_is_set_once() {
        let (completion, _handle) = handle();
        assert!(!completion.is_done());
        assert!(completion.complete(1));
        assert!(!completion.complete(2));
        assert!(!completion.fail(TaskError::Send));
        assert!(completion.is_done());
    }

    #[tokio::test]
    async fn test_first_outcome_wins() {
        let (completion, handle) = handle();
        completion.complete(7);
        completion.complete(8);
        assert_eq!(handle.result().await, Ok(7));
    }

    #[tokio::test]
    async fn test_cancel_before_completion() {
        let (completion, handle) = handle();
        assert!(handle.cancel());
        assert!(handle.is_finished());
        assert!(!completion.complete(1));
        assert_eq!(handle.result().await, Err(TaskError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_after_completion_is_noop() {
        let (completion, handle) = handle();
        completion.complete(3);
        assert!(!handle.cancel());
        assert_eq!(handle.result().await, Ok(3));
    }

    #[tokio::test]
    async fn test_result_within_cancels_on_elapse() {
        let (completion, handle) = handle();
        let outcome = handle.result_within(Duration::from_millis(10)).await;
        assert_eq!(outcome, Err(TaskError::Cancelled));
        assert!(completion.is_done());
    }

    #[tokio::test]
    async fn test_result_within_returns_early_outcome() {
        let (completion, handle) = handle();
        completion.complete(5);
        assert_eq!(handle.result_within(Duration::from_secs(5)).await, Ok(5));
    }

    #[tokio::test]
    async fn test_dropped_sender_is_detached() {
        let (completion, rx) = Completion::<u32>::new();
        let handle = TaskHandle::new(completion.clone(), rx, None);
        // Take the sender out without sending, as a dropped runner would
        // if it never resolved.
        drop(completion.slot.lock().unwrap().take());
        assert_eq!(handle.result().await, Err(TaskError::Detached));
    }
}
