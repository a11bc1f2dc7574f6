// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Start/stop policies for sharing sessions.
//!
//! A policy is a pure transformation from the live subscriber-count signal
//! to a lazy sequence of [`Command`]s. The variants are dispatched through a
//! single tagged enum rather than a trait hierarchy; custom behavior beyond
//! the three variants has not been needed.
//!
//! ## Behavior summary
//!
//! | Policy | Starts | Stops |
//! |--------|--------|-------|
//! | [`Eagerly`](SharingPolicy::Eagerly) | immediately | never |
//! | [`Lazily`](SharingPolicy::Lazily) | on the first subscriber | never |
//! | [`WhileSubscribed`](SharingPolicy::WhileSubscribed) | whenever subscribers appear | `stop_timeout` after the last one leaves |
//!
//! `WhileSubscribed` additionally resets the replay buffer once
//! `replay_expiration` has elapsed after stopping. Both waits are cancelled
//! by a subscriber arriving in the meantime (restart-on-latest: the pending
//! timer is dropped, never queued behind).

use crate::command::Command;
use fanout_core::{StateReader, Subscription};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::time::Duration;

/// Decides when a sharing session's producer runs, based on the live
/// subscriber count.
///
/// ## Example
///
/// ```
/// use fanout_share::SharingPolicy;
/// use std::time::Duration;
///
/// // Stop 5 seconds after the last subscriber leaves; keep the replay
/// // buffer forever.
/// let policy = SharingPolicy::WhileSubscribed {
///     stop_timeout: Duration::from_secs(5),
///     replay_expiration: Duration::MAX,
/// };
/// # let _ = policy;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharingPolicy {
    /// Start the producer immediately and never stop it.
    Eagerly,
    /// Start the producer when the first subscriber appears; never stop it
    /// afterwards, even if all subscribers leave.
    Lazily,
    /// Run the producer only while subscribers are present.
    ///
    /// `stop_timeout` is the grace period after the subscriber count drops
    /// to zero before the producer is stopped. A finite `replay_expiration`
    /// additionally resets the replay buffer that long after stopping;
    /// `Duration::MAX` keeps it forever, `Duration::ZERO` resets it at stop
    /// time. Negative durations are unrepresentable, so the configuration
    /// is valid by construction.
    WhileSubscribed {
        stop_timeout: Duration,
        replay_expiration: Duration,
    },
}

impl SharingPolicy {
    /// `WhileSubscribed` with its default timings: stop as soon as the last
    /// subscriber leaves, keep the replay buffer forever.
    #[must_use]
    pub const fn while_subscribed() -> Self {
        Self::WhileSubscribed {
            stop_timeout: Duration::ZERO,
            replay_expiration: Duration::MAX,
        }
    }

    /// Transform the live subscriber-count signal into the lazy command
    /// sequence for this policy.
    ///
    /// The sequence is already normalized: consecutive duplicate commands
    /// are collapsed and stop commands before the first start are
    /// suppressed (a session that has not started is not "stopped").
    pub fn command_stream(self, counts: StateReader<usize>) -> BoxStream<'static, Command> {
        match self {
            Self::Eagerly => futures::stream::once(std::future::ready(Command::Start)).boxed(),
            Self::Lazily => Box::pin(async_stream::stream! {
                let Ok(mut counts) = counts.subscribe() else { return };
                while let Some(count) = counts.next().await {
                    if count > 0 {
                        yield Command::Start;
                        return;
                    }
                }
            }),
            Self::WhileSubscribed {
                stop_timeout,
                replay_expiration,
            } => Box::pin(while_subscribed_commands(
                counts,
                stop_timeout,
                replay_expiration,
            )),
        }
    }
}

impl Default for SharingPolicy {
    fn default() -> Self {
        Self::Eagerly
    }
}

/// Next observation that differs from the last one seen.
///
/// The count signal conflates for slow observers, so a `0 -> k -> 0`
/// flicker can surface as two consecutive zeros; those carry no
/// information and must not disturb a pending timer. Duplicates are
/// discarded inside the poll, which keeps this cancel-safe in `select!`.
async fn next_distinct(
    counts: &mut Subscription<usize>,
    last: &mut Option<usize>,
) -> Option<usize> {
    while let Some(count) = counts.next().await {
        if Some(count) != *last {
            *last = Some(count);
            return Some(count);
        }
    }
    None
}

fn while_subscribed_commands(
    counts: StateReader<usize>,
    stop_timeout: Duration,
    replay_expiration: Duration,
) -> impl futures::Stream<Item = Command> + Send + 'static {
    async_stream::stream! {
        let Ok(mut counts) = counts.subscribe() else { return };
        let mut last = None;
        let mut running = false;
        let mut next = next_distinct(&mut counts, &mut last).await;
        while let Some(count) = next {
            if count > 0 {
                if !running {
                    running = true;
                    yield Command::Start;
                }
                next = next_distinct(&mut counts, &mut last).await;
                continue;
            }

            // count == 0. Before the first start there is nothing to stop.
            if !running {
                next = next_distinct(&mut counts, &mut last).await;
                continue;
            }

            // Grace period; a returning subscriber cancels the pending stop.
            tokio::select! {
                biased;
                observed = next_distinct(&mut counts, &mut last) => { next = observed; continue; }
                () = tokio::time::sleep(stop_timeout) => {}
            }
            running = false;

            if replay_expiration.is_zero() {
                yield Command::StopAndResetBuffer;
                next = next_distinct(&mut counts, &mut last).await;
                continue;
            }
            yield Command::Stop;

            if replay_expiration == Duration::MAX {
                next = next_distinct(&mut counts, &mut last).await;
                continue;
            }
            tokio::select! {
                biased;
                observed = next_distinct(&mut counts, &mut last) => { next = observed; continue; }
                () = tokio::time::sleep(replay_expiration) => {}
            }
            yield Command::StopAndResetBuffer;
            next = next_distinct(&mut counts, &mut last).await;
        }
    }
}
