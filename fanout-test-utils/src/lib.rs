// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the fanout workspace.
//!
//! Provides push-controlled test channels that present as cold-source
//! streams, timeout-guarded stream assertions, and a couple of small value
//! fixtures. For development and testing only.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

pub mod helpers;
pub mod person;

pub use helpers::{assert_no_element_emitted, assert_stream_ended, eventually, unwrap_stream};
pub use person::{person_alice, person_bob, person_charlie, Person};

use fanout_core::SourceItem;
use futures::Stream;

/// A test channel whose receiving side is a stream of `SourceItem::Value`s.
///
/// The receiver is clonable, so a closure over it is a re-openable cold
/// source:
///
/// ```
/// use fanout_test_utils::test_channel;
/// use futures::StreamExt;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (tx, rx) = test_channel::<i32>();
/// let source = move || rx.clone().map(fanout_core::SourceItem::Value);
/// # let _ = (tx, source);
/// # }
/// ```
pub fn test_channel<T: Send + 'static>() -> (
    async_channel::Sender<T>,
    async_channel::Receiver<T>,
) {
    async_channel::unbounded()
}

/// A test channel carrying explicit [`SourceItem`]s, for driving error
/// propagation scenarios.
pub fn test_channel_with_errors<T: Send + 'static>() -> (
    async_channel::Sender<SourceItem<T>>,
    impl Stream<Item = SourceItem<T>> + Send + Clone,
) {
    async_channel::unbounded()
}
