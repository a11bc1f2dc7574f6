// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::replay_subject::{NextValue, SharedState};
use futures::Stream;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// A single subscriber's view of a [`ReplaySubject`](crate::ReplaySubject).
///
/// The subscription is an unbounded stream: it yields every value from its
/// private cursor onwards, in emission order, parking whenever it has caught
/// up with the subject. It ends when the subject is closed (after draining
/// what is still buffered for it).
///
/// Under the `DropOldest` overflow policy a subscription that falls behind
/// has its cursor advanced past evicted values. The skip is silent by
/// design: the stream continues gap-free from the oldest retained value and
/// no error is surfaced.
///
/// Dropping the subscription unregisters it; other subscribers and the
/// producer are unaffected.
pub struct Subscription<T: Clone + Send + Sync + 'static> {
    state: Arc<Mutex<SharedState<T>>>,
    id: u64,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    pub(crate) fn new(state: Arc<Mutex<SharedState<T>>>, id: u64) -> Self {
        Self { state, id }
    }
}

impl<T: Clone + Send + Sync + 'static> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.state.lock().poll_next_value(this.id, cx.waker()) {
            NextValue::Ready(value) => Poll::Ready(Some(value)),
            NextValue::Ended => Poll::Ready(None),
            NextValue::Pending => Poll::Pending,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.state.lock().drop_subscriber(self.id);
    }
}
