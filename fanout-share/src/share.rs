// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Entry points wiring a cold source, a policy and a broadcast together.

use crate::buffered::Buffered;
use crate::coordinator::{spawn_coordinator, Fusion, StateSink};
use crate::logging::error;
use crate::sharing_policy::SharingPolicy;
use fanout_core::{
    BufferOverflow, BufferSpec, ColdSource, FanoutError, ReplaySubject, SharedConfig, SharedReader,
    SourceItem, StateReader, StateSubject, TaskHandle,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Extra buffer capacity `share` uses when the source does not carry its own
/// buffering configuration.
pub const DEFAULT_EXTRA_CAPACITY: usize = 64;

/// Sharing entry points, available on every [`ColdSource`].
///
/// ## Example
///
/// ```
/// use fanout_core::iter;
/// use fanout_share::{ShareExt, SharingPolicy};
/// use futures::StreamExt;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let shared = iter([1, 2, 3]).share(2, SharingPolicy::Eagerly).unwrap();
/// let mut subscriber = shared.subscribe().unwrap();
///
/// assert_eq!(subscriber.next().await, Some(1));
/// assert_eq!(subscriber.next().await, Some(2));
/// assert_eq!(subscriber.next().await, Some(3));
/// # }
/// ```
pub trait ShareExt: ColdSource + Sized {
    /// Annotate this source with a buffer of `capacity` slots and an
    /// overflow policy.
    ///
    /// When the result is passed straight to [`share`](ShareExt::share), the
    /// configuration is fused into the broadcast buffer; otherwise an
    /// explicit buffering stage runs between the source and its consumer.
    fn buffered(self, capacity: usize, overflow: BufferOverflow) -> Buffered<Self> {
        Buffered::new(self, capacity, overflow)
    }

    /// Turn this cold source into a hot broadcast shared by all subscribers.
    ///
    /// The producer runs at most once at a time, driven by `policy`; the
    /// broadcast retains the `replay` most recent values for late
    /// subscribers. A directly-chained [`buffered`](ShareExt::buffered)
    /// wrapper contributes its capacity and overflow policy to the broadcast
    /// buffer; otherwise [`DEFAULT_EXTRA_CAPACITY`] suspending slots are
    /// used.
    ///
    /// The returned reader owns the sharing session: dropping its last clone
    /// cancels the producer, resets the buffer and closes the broadcast.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a capacity/overflow combination the
    /// broadcast rejects (a dropping policy with zero total capacity).
    fn share(
        self,
        replay: usize,
        policy: SharingPolicy,
    ) -> Result<SharedReader<Self::Item>, FanoutError> {
        let (spec, fusion) = match self.buffer_spec() {
            Some(spec) => (spec, Fusion::Adopted),
            None => (
                BufferSpec {
                    capacity: DEFAULT_EXTRA_CAPACITY,
                    overflow: BufferOverflow::Suspend,
                },
                Fusion::None,
            ),
        };
        let config = SharedConfig::new(replay, spec.capacity, spec.overflow)?;
        let subject = ReplaySubject::with_config(config);
        let task = spawn_coordinator(Arc::new(self), subject.clone(), policy, fusion);
        Ok(SharedReader::with_task(subject, task))
    }

    /// Turn this cold source into a live latest-value view seeded with
    /// `initial`.
    ///
    /// Values produced while the policy keeps the producer running update
    /// the view in place; duplicate consecutive values are suppressed. A
    /// buffer reset (policy expiration or session teardown) reinitializes
    /// the view to `initial`.
    fn state(self, initial: Self::Item, policy: SharingPolicy) -> StateReader<Self::Item>
    where
        Self::Item: PartialEq,
    {
        let subject = StateSubject::new(initial.clone());
        let sink = StateSink {
            subject: subject.clone(),
            reset_value: initial,
        };
        let task = spawn_coordinator(Arc::new(self), sink, policy, Fusion::None);
        StateReader::with_task(subject, task)
    }
}

impl<C: ColdSource> ShareExt for C {}

/// Eagerly start producing and suspend until the first value arrives, then
/// return a live latest-value view seeded with it.
///
/// The producer keeps running for the lifetime of the returned reader,
/// updating the view in place; duplicate consecutive values are suppressed.
/// There is no initial value and no policy choice: the session is eager and
/// never stops on its own.
///
/// # Errors
///
/// Returns the upstream failure when the source fails before producing a
/// value, or a stream processing error when it completes empty.
pub async fn state_from_first<C>(source: C) -> Result<StateReader<C::Item>, FanoutError>
where
    C: ColdSource,
    C::Item: PartialEq,
{
    let (seed_tx, seed_rx) = oneshot::channel::<Result<StateSubject<C::Item>, FanoutError>>();

    let task = TaskHandle::spawn(move |cancel| async move {
        let mut stream = source.open();
        let first = tokio::select! {
            () = cancel.cancelled() => return,
            item = stream.next() => item,
        };
        let subject = match first {
            Some(SourceItem::Value(value)) => {
                let subject = StateSubject::new(value);
                if seed_tx.send(Ok(subject.clone())).is_err() {
                    return; // caller went away before the first value
                }
                subject
            }
            Some(SourceItem::Error(e)) => {
                let _ = seed_tx.send(Err(e));
                return;
            }
            None => {
                let _ = seed_tx.send(Err(FanoutError::stream_error(
                    "cold source completed before producing a value",
                )));
                return;
            }
        };
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                item = stream.next() => match item {
                    Some(SourceItem::Value(value)) => {
                        if subject.set(value).is_err() {
                            break;
                        }
                    }
                    Some(SourceItem::Error(e)) => {
                        error!("upstream source failed: {e}");
                        break;
                    }
                    None => break,
                },
            }
        }
        // An exhausted upstream leaves the view alive and idle; only the
        // session's teardown closes it.
        cancel.cancelled().await;
        subject.close();
    });

    let subject = seed_rx
        .await
        .map_err(|_| FanoutError::stream_error("producer task ended before producing a value"))??;
    Ok(StateReader::with_task(subject, task))
}
