// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::SubjectError;
use crate::state_subject::StateSubject;
use crate::subscription::Subscription;
use crate::task_handle::TaskHandle;
use std::sync::Arc;

/// Read-only view of a [`StateSubject`].
///
/// Exposes reading the current value and subscribing, by delegation to the
/// mutable subject. Readers produced by the sharing entry points also own
/// the session's coordinator task; dropping the last clone tears the
/// session down.
pub struct StateReader<T: Clone + PartialEq + Send + Sync + 'static> {
    subject: StateSubject<T>,
    _task: Option<Arc<TaskHandle>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> StateReader<T> {
    /// Wrap a subject in a read-only view with no owned task.
    #[must_use]
    pub fn new(subject: StateSubject<T>) -> Self {
        Self {
            subject,
            _task: None,
        }
    }

    /// Wrap a subject together with the background task driving it.
    ///
    /// Prefer the sharing entry points over calling this directly.
    #[must_use]
    pub fn with_task(subject: StateSubject<T>, task: TaskHandle) -> Self {
        Self {
            subject,
            _task: Some(Arc::new(task)),
        }
    }

    /// Read the current value.
    #[must_use]
    pub fn value(&self) -> T {
        self.subject.value()
    }

    /// Subscribe to the current value and subsequent distinct updates.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Closed` when the underlying subject has been
    /// closed.
    pub fn subscribe(&self) -> Result<Subscription<T>, SubjectError> {
        self.subject.subscribe()
    }

    /// Live subscriber-count signal.
    pub fn subscription_count(&self) -> StateReader<usize> {
        self.subject.subscription_count()
    }

    /// Snapshot of the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subject.subscriber_count()
    }

    /// Returns `true` once the underlying subject has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.subject.is_closed()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Clone for StateReader<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            _task: self._task.clone(),
        }
    }
}
