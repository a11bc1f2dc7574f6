// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Hot sharing of cold asynchronous sources.
//!
//! A cold source runs once per consumer; sharing it turns the single
//! producer into a hot broadcast that an arbitrary, changing set of
//! subscribers can observe without re-running the work:
//!
//! ```
//! use fanout::prelude::*;
//! use futures::StreamExt;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // A cold source is a recipe: each producer start opens it afresh.
//! let source = fanout::iter([10, 20, 30]);
//!
//! // Share it with a replay window of two values.
//! let shared = source.share(2, SharingPolicy::Eagerly).unwrap();
//!
//! let mut subscriber = shared.subscribe().unwrap();
//! assert_eq!(subscriber.next().await, Some(10));
//! assert_eq!(subscriber.next().await, Some(20));
//! assert_eq!(subscriber.next().await, Some(30));
//! # }
//! ```
//!
//! ## Crate layout
//!
//! - `fanout-core`: the broadcast primitives ([`ReplaySubject`],
//!   [`StateSubject`], readers, subscriptions, cancellation).
//! - `fanout-share`: policies, the sharing coordinator and the entry points
//!   ([`ShareExt`], [`state_from_first`]).
//! - This crate re-exports both and adds channel adapters
//!   ([`IntoColdSource`]).
//!
//! ## Choosing a policy
//!
//! - [`SharingPolicy::Eagerly`]: start producing immediately, never stop.
//! - [`SharingPolicy::Lazily`]: start on the first subscriber, never stop.
//! - [`SharingPolicy::WhileSubscribed`]: run only while subscribers exist,
//!   with a stop grace period and an optional replay-buffer expiration.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

pub mod channel_ext;
pub mod prelude;

pub use channel_ext::IntoColdSource;

pub use fanout_core::{
    from_fn, iter, once, BoxSourceStream, BufferOverflow, BufferSpec, CancellationToken,
    ColdSource, FanoutError, ReplaySubject, Result, SharedConfig, SharedReader, SourceItem,
    StateReader, StateSubject, SubjectError, Subscription, TaskHandle,
};
pub use fanout_share::{
    state_from_first, Buffered, Command, ShareExt, SharingPolicy, DEFAULT_EXTRA_CAPACITY,
};
