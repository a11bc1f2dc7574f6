// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Latest-value broadcast: the replay-of-one, conflating specialization of
//! [`ReplaySubject`](crate::ReplaySubject).
//!
//! A [`StateSubject`] always holds exactly one current value. Writes are
//! equality-suppressed (setting the value it already holds is a no-op that
//! notifies nobody), reads are synchronous, and slow subscribers observe
//! only the latest value (conflation).
//!
//! ## Example
//!
//! ```
//! use fanout_core::StateSubject;
//! use futures::StreamExt;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let state = StateSubject::new(0);
//! assert_eq!(state.value(), 0);
//!
//! let mut subscriber = state.subscribe().unwrap();
//! assert_eq!(subscriber.next().await, Some(0)); // current value first
//!
//! assert!(state.set(1).unwrap());
//! assert!(!state.set(1).unwrap()); // duplicate suppressed
//! assert_eq!(subscriber.next().await, Some(1));
//! # }
//! ```

use crate::config::SharedConfig;
use crate::error::SubjectError;
use crate::replay_subject::ReplaySubject;
use crate::state_reader::StateReader;
use crate::subscription::Subscription;

/// A broadcast of the latest distinct value.
///
/// Built on a [`ReplaySubject`] configured with `replay = 1`, no extra
/// capacity and the `DropOldest` overflow policy, plus equality-based
/// suppression of duplicate writes. Emission never suspends.
pub struct StateSubject<T: Clone + PartialEq + Send + Sync + 'static> {
    inner: ReplaySubject<T>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> StateSubject<T> {
    /// Create a subject holding `initial`.
    ///
    /// There is no empty state: the subject holds a value from the moment it
    /// is constructed.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: ReplaySubject::seeded(SharedConfig::conflated(), initial),
        }
    }

    /// Read the current value.
    #[must_use]
    pub fn value(&self) -> T {
        self.inner
            .latest()
            .expect("state subject always holds a value")
    }

    /// Publish a new value.
    ///
    /// Returns `Ok(true)` when the value was distinct from the current one
    /// and was published, `Ok(false)` when it was suppressed as a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Closed` when the subject has been closed.
    pub fn set(&self, value: T) -> Result<bool, SubjectError> {
        self.inner.emit_distinct(value)
    }

    /// Subscribe to the current value and subsequent distinct updates.
    ///
    /// The subscription yields the value held at subscription time first. A
    /// subscriber that falls behind skips straight to the latest value.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Closed` when the subject has been closed.
    pub fn subscribe(&self) -> Result<Subscription<T>, SubjectError> {
        self.inner.subscribe()
    }

    /// Reinitialize to `value`, discarding the current value.
    ///
    /// Unlike a plain buffer reset this never leaves the subject empty;
    /// subscribers observe `value` as the next update unless it equals the
    /// value already held, in which case nothing happens.
    pub fn reset(&self, value: T) {
        self.inner.reset_seeded(value);
    }

    /// Live subscriber-count signal.
    pub fn subscription_count(&self) -> StateReader<usize> {
        self.inner.subscription_count()
    }

    /// Snapshot of the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    /// Close the subject; subscribers drain and end.
    pub fn close(&self) {
        self.inner.close();
    }

    /// Returns `true` once the subject has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// A read-only view of this subject.
    #[must_use]
    pub fn reader(&self) -> StateReader<T> {
        StateReader::new(self.clone())
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Clone for StateSubject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
