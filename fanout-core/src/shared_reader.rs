// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::SubjectError;
use crate::replay_subject::ReplaySubject;
use crate::state_reader::StateReader;
use crate::subscription::Subscription;
use crate::task_handle::TaskHandle;
use std::sync::Arc;

/// Read-only view of a [`ReplaySubject`].
///
/// The reader exposes only the non-mutating subset of the subject's
/// operations; it is a capability restriction by delegation, not a separate
/// implementation. Readers produced by the sharing entry points additionally
/// own the sharing session's coordinator task: dropping the last clone of
/// such a reader cancels the session, which resets the buffer and closes the
/// subject as its final cleanup.
pub struct SharedReader<T: Clone + Send + Sync + 'static> {
    subject: ReplaySubject<T>,
    _task: Option<Arc<TaskHandle>>,
}

impl<T: Clone + Send + Sync + 'static> SharedReader<T> {
    /// Wrap a subject in a read-only view with no owned task.
    #[must_use]
    pub fn new(subject: ReplaySubject<T>) -> Self {
        Self {
            subject,
            _task: None,
        }
    }

    /// Wrap a subject together with the background task driving it.
    ///
    /// Prefer the sharing entry points over calling this directly.
    #[must_use]
    pub fn with_task(subject: ReplaySubject<T>, task: TaskHandle) -> Self {
        Self {
            subject,
            _task: Some(Arc::new(task)),
        }
    }

    /// Subscribe to replayed and live values.
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

impl<T: Clone + Send + Sync + 'static> Clone for SharedReader<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            _task: self._task.clone(),
        }
    }
}
