// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Buffering configuration for broadcast subjects.

use crate::error::FanoutError;

/// Behavior when buffered-but-undelivered values exceed the configured
/// capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BufferOverflow {
    /// Suspend the emitter until every subscriber has caught up.
    ///
    /// This is the backpressure mode: the emitting task parks without
    /// busy-waiting and is resumed in emission order once the buffer has
    /// drained.
    #[default]
    Suspend,
    /// Evict the oldest buffered value to make room for the new one.
    ///
    /// A subscriber that had not yet consumed the evicted value has its
    /// cursor advanced past it. The skip is silent: the subscriber observes
    /// a gap-free stream of the values that remain, with no error item.
    DropOldest,
    /// Discard the newly emitted value, leaving the buffer untouched.
    DropLatest,
}

/// Buffer capacity and overflow policy reported by a transparent buffer
/// wrapper, adopted by `share` when fusing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSpec {
    /// Number of extra (non-replay) buffer slots.
    pub capacity: usize,
    /// What to do when the buffer is full.
    pub overflow: BufferOverflow,
}

/// Buffering configuration of a [`ReplaySubject`](crate::ReplaySubject).
///
/// The total buffer capacity is `replay + extra_capacity`: the replay window
/// retained for late subscribers plus the extra slots used to absorb bursts
/// before the overflow policy kicks in.
#[derive(Debug, Clone, Copy)]
pub struct SharedConfig {
    replay: usize,
    extra_capacity: usize,
    overflow: BufferOverflow,
}

impl SharedConfig {
    /// Build and validate a buffering configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `overflow` is a dropping policy and
    /// the total capacity is zero: there would be nothing to drop from.
    /// Negative replay or capacity values are unrepresentable (`usize`), so
    /// the remaining validation the original contract asks for is carried by
    /// the type system.
    pub fn new(
        replay: usize,
        extra_capacity: usize,
        overflow: BufferOverflow,
    ) -> Result<Self, FanoutError> {
        if replay + extra_capacity == 0 && overflow != BufferOverflow::Suspend {
            return Err(FanoutError::config_error(
                "a dropping overflow policy requires replay or extra capacity to be positive",
            ));
        }
        Ok(Self {
            replay,
            extra_capacity,
            overflow,
        })
    }

    /// Replay-only configuration: `extra_capacity = 0`, suspending overflow.
    pub fn replaying(replay: usize) -> Self {
        Self {
            replay,
            extra_capacity: 0,
            overflow: BufferOverflow::Suspend,
        }
    }

    // replay = 1, conflating; the StateSubject configuration.
    pub(crate) const fn conflated() -> Self {
        Self {
            replay: 1,
            extra_capacity: 0,
            overflow: BufferOverflow::DropOldest,
        }
    }

    /// Number of values retained for replay to late subscribers.
    pub const fn replay(&self) -> usize {
        self.replay
    }

    /// Number of extra (non-replay) buffer slots.
    pub const fn extra_capacity(&self) -> usize {
        self.extra_capacity
    }

    /// The configured overflow policy.
    pub const fn overflow(&self) -> BufferOverflow {
        self.overflow
    }

    /// Total buffer capacity: `replay + extra_capacity`.
    pub const fn capacity(&self) -> usize {
        self.replay + self.extra_capacity
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::replaying(0)
    }
}
