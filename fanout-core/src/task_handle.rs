// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Background task ownership with cooperative cancellation.

use crate::CancellationToken;
use std::future::Future;

/// Handle to a spawned background task, cancelled on drop.
///
/// The spawned closure receives a [`CancellationToken`] it is expected to
/// monitor; dropping the handle (or calling [`cancel`](TaskHandle::cancel))
/// signals the token, and the task exits at its next cancellation
/// checkpoint. [`stop`](TaskHandle::stop) additionally awaits the task's
/// completion, which is what the sharing coordinator uses to guarantee that
/// at most one producer runs at a time.
///
/// # Example
///
/// ```
/// use fanout_core::TaskHandle;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let task = TaskHandle::spawn(|cancel| async move {
///     cancel.cancelled().await;
/// });
///
/// task.stop().await; // cancel and wait for the task to finish
/// # }
/// ```
#[derive(Debug)]
pub struct TaskHandle {
    cancel: CancellationToken,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TaskHandle {
    /// Spawn a background task on the ambient tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime, as `tokio::spawn` does.
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(f(cancel.clone()));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Signal cancellation without waiting for the task to exit.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the task and wait for it to run to completion.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
