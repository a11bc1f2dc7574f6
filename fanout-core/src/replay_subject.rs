// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Hot, multi-subscriber broadcast with replay and backpressure.
//!
//! A [`ReplaySubject`] broadcasts every emitted value to all active
//! subscribers and retains the most recent `replay` values for late
//! subscribers.
//!
//! ## Characteristics
//!
//! - **Hot with replay**: late subscribers receive up to `replay` of the
//!   most recently emitted values, then live emissions.
//! - **Bounded**: the buffer holds at most `replay + extra_capacity` values;
//!   the configured [`BufferOverflow`] policy decides what happens beyond
//!   that (suspend the emitter, drop the oldest value, drop the newest).
//! - **Thread-safe**: cheap to clone; all clones share the same state.
//! - **Never completes on its own**: an idle subject stays subscribable
//!   until [`close`](ReplaySubject::close) is called.
//!
//! ## Example
//!
//! ```
//! use fanout_core::ReplaySubject;
//! use futures::StreamExt;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let subject = ReplaySubject::<i32>::new(1);
//!
//! // Emitted without subscribers: retained in the replay window.
//! subject.emit(1).await.unwrap();
//!
//! let mut subscriber = subject.subscribe().unwrap();
//! assert_eq!(subscriber.next().await, Some(1)); // replayed
//!
//! subject.emit(2).await.unwrap();
//! assert_eq!(subscriber.next().await, Some(2)); // live
//! # }
//! ```

use crate::config::{BufferOverflow, SharedConfig};
use crate::error::SubjectError;
use crate::replay_buffer::ReplayBuffer;
use crate::shared_reader::SharedReader;
use crate::state_reader::StateReader;
use crate::state_subject::StateSubject;
use crate::subscription::Subscription;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

pub(crate) struct SubscriberSlot {
    pub(crate) cursor: u64,
    pub(crate) waker: Option<Waker>,
}

struct EmitWaiter {
    ticket: u64,
    waker: Waker,
}

pub(crate) enum EmitOutcome {
    /// The value was handled per the configuration (buffered or dropped).
    Emitted,
    /// Suspension would be required and no waker was supplied.
    Rejected,
    /// The value was queued and the emitter parked under this ticket.
    Parked(u64),
}

pub(crate) enum NextValue<T> {
    Ready(T),
    Ended,
    Pending,
}

pub(crate) struct SharedState<T> {
    config: SharedConfig,
    buffer: ReplayBuffer<T>,
    subscribers: HashMap<u64, SubscriberSlot>,
    next_subscriber_id: u64,
    waiting_emitters: VecDeque<EmitWaiter>,
    resumed_emitters: HashSet<u64>,
    next_ticket: u64,
    closed: bool,
    count_signal: Option<StateSubject<usize>>,
}

impl<T: Clone + Send + Sync + 'static> SharedState<T> {
    fn new(config: SharedConfig) -> Self {
        Self {
            config,
            buffer: ReplayBuffer::new(),
            subscribers: HashMap::new(),
            next_subscriber_id: 0,
            waiting_emitters: VecDeque::new(),
            resumed_emitters: HashSet::new(),
            next_ticket: 0,
            closed: false,
            count_signal: None,
        }
    }

    fn min_cursor(&self) -> u64 {
        self.subscribers
            .values()
            .map(|slot| slot.cursor)
            .min()
            .unwrap_or_else(|| self.buffer.next_index())
    }

    /// Evict values no subscriber needs anymore and that are outside the
    /// replay window.
    fn trim(&mut self) {
        let next = self.buffer.next_index();
        let replay_from = next.saturating_sub(self.config.replay() as u64);
        self.buffer.drop_through(self.min_cursor().min(replay_from));
    }

    fn wake_subscribers(&mut self) {
        for slot in self.subscribers.values_mut() {
            if let Some(waker) = slot.waker.take() {
                waker.wake();
            }
        }
    }

    fn resume_all_emitters(&mut self) {
        for waiter in self.waiting_emitters.drain(..) {
            self.resumed_emitters.insert(waiter.ticket);
            waiter.waker.wake();
        }
    }

    /// Parked emitters resume only once every subscriber has caught up (or
    /// none are left to wait for). They are woken in emission order.
    fn maybe_resume_emitters(&mut self) {
        if self.waiting_emitters.is_empty() {
            return;
        }
        if self.subscribers.is_empty() || self.min_cursor() == self.buffer.next_index() {
            self.trim();
            self.resume_all_emitters();
        }
    }

    /// Count mutation and signal publication happen under the subject lock,
    /// so no observer can see a skipped counter value.
    fn publish_count(&self) {
        if let Some(signal) = &self.count_signal {
            let _ = signal.set(self.subscribers.len());
        }
    }

    fn reset_locked(&mut self) {
        self.buffer.clear_to_baseline();
        let baseline = self.buffer.next_index();
        for slot in self.subscribers.values_mut() {
            slot.cursor = baseline;
        }
        // In-flight emits complete, but their values are not retained.
        self.resume_all_emitters();
    }

    pub(crate) fn emit_locked(
        &mut self,
        value: T,
        waker: Option<&Waker>,
    ) -> Result<EmitOutcome, SubjectError> {
        if self.closed {
            return Err(SubjectError::Closed);
        }
        self.trim();
        let capacity = self.config.capacity();

        if self.subscribers.is_empty() {
            // No subscriber to pace against: retain the replay window only,
            // so the first real subscriber still gets a replay.
            self.buffer.push(value);
            while self.buffer.len() > self.config.replay() {
                self.buffer.drop_oldest();
            }
            return Ok(EmitOutcome::Emitted);
        }

        // Replay-only entries every subscriber has consumed are stale; evict
        // them before treating the buffer as full.
        while self.buffer.len() >= capacity && self.min_cursor() > self.buffer.oldest_index() {
            self.buffer.drop_oldest();
        }

        if self.buffer.len() >= capacity {
            match self.config.overflow() {
                BufferOverflow::DropLatest => return Ok(EmitOutcome::Emitted),
                BufferOverflow::DropOldest => {
                    self.buffer.drop_oldest();
                    let oldest = self.buffer.oldest_index();
                    for slot in self.subscribers.values_mut() {
                        if slot.cursor < oldest {
                            slot.cursor = oldest; // silent skip
                        }
                    }
                }
                BufferOverflow::Suspend => {
                    let Some(waker) = waker else {
                        return Ok(EmitOutcome::Rejected);
                    };
                    // The value is queued now, transiently exceeding the
                    // capacity; the emitter parks until all subscribers have
                    // caught up.
                    self.buffer.push(value);
                    self.wake_subscribers();
                    let ticket = self.next_ticket;
                    self.next_ticket += 1;
                    self.waiting_emitters.push_back(EmitWaiter {
                        ticket,
                        waker: waker.clone(),
                    });
                    return Ok(EmitOutcome::Parked(ticket));
                }
            }
        }

        self.buffer.push(value);
        self.wake_subscribers();
        Ok(EmitOutcome::Emitted)
    }

    pub(crate) fn poll_next_value(&mut self, id: u64, waker: &Waker) -> NextValue<T> {
        let Some(slot) = self.subscribers.get_mut(&id) else {
            return NextValue::Ended;
        };
        if slot.cursor < self.buffer.next_index() {
            let value = self.buffer.get(slot.cursor).cloned();
            slot.cursor += 1;
            self.trim();
            self.maybe_resume_emitters();
            return match value {
                Some(value) => NextValue::Ready(value),
                None => NextValue::Ended,
            };
        }
        if self.closed {
            return NextValue::Ended;
        }
        slot.waker = Some(waker.clone());
        NextValue::Pending
    }

    pub(crate) fn drop_subscriber(&mut self, id: u64) {
        if self.subscribers.remove(&id).is_some() {
            self.trim();
            self.maybe_resume_emitters();
            self.publish_count();
        }
    }
}

/// A hot broadcast subject with a replay window and bounded buffering.
///
/// See the [module documentation](self) for semantics and examples.
pub struct ReplaySubject<T: Clone + Send + Sync + 'static> {
    state: Arc<Mutex<SharedState<T>>>,
}

impl<T: Clone + Send + Sync + 'static> ReplaySubject<T> {
    /// Create a subject retaining the `replay` most recent values, with no
    /// extra capacity and the suspending overflow policy.
    #[must_use]
    pub fn new(replay: usize) -> Self {
        Self::with_config(SharedConfig::replaying(replay))
    }

    /// Create a subject with an explicit buffering configuration.
    #[must_use]
    pub fn with_config(config: SharedConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SharedState::new(config))),
        }
    }

    // Construct with a single pre-buffered value; used by StateSubject so
    // that its "always holds a value" invariant is true from birth.
    pub(crate) fn seeded(config: SharedConfig, value: T) -> Self {
        let subject = Self::with_config(config);
        subject.state.lock().buffer.push(value);
        subject
    }

    /// Emit a value to all subscribers.
    ///
    /// The returned future resolves once the value has been handled per the
    /// buffering configuration. Under [`BufferOverflow::Suspend`] it parks
    /// when the buffer is full, resuming (in emission order) once every
    /// subscriber has caught up; the structural lock is not held while
    /// parked, so subscribers keep draining.
    ///
    /// # Errors
    ///
    /// Resolves to `SubjectError::Closed` when the subject has been closed.
    pub fn emit(&self, value: T) -> Emit<'_, T> {
        Emit {
            subject: self,
            value: Some(value),
            ticket: None,
        }
    }

    /// Non-suspending variant of [`emit`](ReplaySubject::emit).
    ///
    /// Returns `Ok(false)` if the value was rejected because the suspending
    /// overflow policy would have parked the caller. Values handled by a
    /// dropping policy count as accepted.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Closed` when the subject has been closed.
    pub fn try_emit(&self, value: T) -> Result<bool, SubjectError> {
        let mut guard = self.state.lock();
        match guard.emit_locked(value, None)? {
            EmitOutcome::Rejected => Ok(false),
            _ => Ok(true),
        }
    }

    /// Register a new subscriber.
    ///
    /// The subscriber first receives up to `replay` of the most recently
    /// emitted values (fewer while the subject is still priming), then every
    /// subsequent emission in order. The returned [`Subscription`] is an
    /// unbounded stream that parks while it is caught up.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Closed` when the subject has been closed.
    pub fn subscribe(&self) -> Result<Subscription<T>, SubjectError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.closed {
            return Err(SubjectError::Closed);
        }
        let id = state.next_subscriber_id;
        state.next_subscriber_id += 1;
        let next = state.buffer.next_index();
        let replayable = (state.config.replay() as u64).min(state.buffer.len() as u64);
        state.subscribers.insert(
            id,
            SubscriberSlot {
                cursor: next - replayable,
                waker: None,
            },
        );
        state.publish_count();
        Ok(Subscription::new(Arc::clone(&self.state), id))
    }

    /// Atomically clear the retained values and advance the replay baseline.
    ///
    /// Existing subscribers see no further replay, subscribers registering
    /// afterwards start empty, and parked emitters complete without their
    /// values being retained.
    pub fn reset_buffer(&self) {
        let mut guard = self.state.lock();
        if guard.closed {
            return;
        }
        guard.reset_locked();
    }

    /// Close the subject.
    ///
    /// Subscribers drain whatever is still buffered for them and then end;
    /// further `emit`/`subscribe` calls return `SubjectError::Closed`.
    /// Closing is idempotent.
    pub fn close(&self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.closed {
            return;
        }
        state.closed = true;
        state.resume_all_emitters();
        state.wake_subscribers();
        if let Some(signal) = &state.count_signal {
            signal.close();
        }
    }

    /// Returns `true` once the subject has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Snapshot of the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Live subscriber-count signal.
    ///
    /// The signal is itself a latest-value broadcast: it replays the current
    /// count to new observers and conflates intermediate values for slow
    /// ones, but every published value reflects an actual subscribe or
    /// unsubscribe that happened.
    pub fn subscription_count(&self) -> StateReader<usize> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let count = state.subscribers.len();
        state
            .count_signal
            .get_or_insert_with(|| StateSubject::new(count))
            .reader()
    }

    /// A read-only view of this subject.
    #[must_use]
    pub fn reader(&self) -> SharedReader<T> {
        SharedReader::new(self.clone())
    }

    pub(crate) fn latest(&self) -> Option<T> {
        self.state.lock().buffer.latest().cloned()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> ReplaySubject<T> {
    // Equality-suppressed emission: a value equal to the most recent one
    // leaves index, buffer and subscribers untouched. Returns whether the
    // value was published.
    pub(crate) fn emit_distinct(&self, value: T) -> Result<bool, SubjectError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.closed {
            return Err(SubjectError::Closed);
        }
        if state.buffer.latest() == Some(&value) {
            return Ok(false);
        }
        match state.emit_locked(value, None)? {
            EmitOutcome::Rejected => Ok(false),
            _ => Ok(true),
        }
    }

    // Reset to a caller-specified value instead of truly emptying; no-op
    // when the subject already holds exactly that value.
    pub(crate) fn reset_seeded(&self, seed: T) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.closed {
            return;
        }
        if state.buffer.latest() == Some(&seed) {
            return;
        }
        state.reset_locked();
        state.buffer.push(seed);
        state.wake_subscribers();
    }
}

impl<T: Clone + Send + Sync + 'static> Clone for ReplaySubject<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

/// Future returned by [`ReplaySubject::emit`].
pub struct Emit<'a, T: Clone + Send + Sync + 'static> {
    subject: &'a ReplaySubject<T>,
    value: Option<T>,
    ticket: Option<u64>,
}

// No self-references: the future is state machine data plus a borrow.
impl<T: Clone + Send + Sync + 'static> Unpin for Emit<'_, T> {}

impl<T: Clone + Send + Sync + 'static> Future for Emit<'_, T> {
    type Output = Result<(), SubjectError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let mut guard = this.subject.state.lock();
        let state = &mut *guard;

        if let Some(ticket) = this.ticket {
            if state.resumed_emitters.remove(&ticket) {
                this.ticket = None;
                return Poll::Ready(Ok(()));
            }
            if let Some(waiter) = state
                .waiting_emitters
                .iter_mut()
                .find(|waiter| waiter.ticket == ticket)
            {
                waiter.waker = cx.waker().clone();
            }
            return Poll::Pending;
        }

        let Some(value) = this.value.take() else {
            // Polled again after completion.
            return Poll::Ready(Ok(()));
        };
        match state.emit_locked(value, Some(cx.waker())) {
            Err(e) => Poll::Ready(Err(e)),
            Ok(EmitOutcome::Parked(ticket)) => {
                this.ticket = Some(ticket);
                Poll::Pending
            }
            Ok(_) => Poll::Ready(Ok(())),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for Emit<'_, T> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket {
            // Cancelled while parked: withdraw from the waiter queue. The
            // queued value stays; it was already published to subscribers.
            let mut state = self.subject.state.lock();
            state.waiting_emitters.retain(|waiter| waiter.ticket != ticket);
            state.resumed_emitters.remove(&ticket);
        }
    }
}
