// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The producible-sequence abstraction consumed by the sharing layer.
//!
//! A [`ColdSource`] is a recipe, not a stream: every call to
//! [`open`](ColdSource::open) produces a fresh stream of
//! [`SourceItem`]s. The sharing coordinator opens the source once per
//! producer start, which is what makes stop/restart policies possible.
//!
//! Any `Fn() -> impl Stream<Item = SourceItem<T>>` closure is a cold source,
//! so the usual way to build one is a closure over the inputs it needs:
//!
//! ```
//! use fanout_core::{ColdSource, SourceItem};
//! use futures::{stream, StreamExt};
//!
//! let source = || stream::iter(vec![1, 2, 3]).map(SourceItem::Value);
//! let opened = source.open();
//! ```

use crate::config::BufferSpec;
use crate::source_item::SourceItem;
use futures::{stream, Stream, StreamExt};
use std::pin::Pin;

/// Boxed stream of source items, as produced by [`ColdSource::open`].
pub type BoxSourceStream<T> = Pin<Box<dyn Stream<Item = SourceItem<T>> + Send + 'static>>;

/// A cold, re-openable sequence of values.
pub trait ColdSource: Send + Sync + 'static {
    /// The value type the source produces.
    type Item: Clone + Send + Sync + 'static;

    /// Open the source, producing a fresh stream of items.
    fn open(&self) -> BoxSourceStream<Self::Item>;

    /// Buffer capacity and overflow policy this source asks its consumer to
    /// adopt, if it is a transparent buffer wrapper.
    ///
    /// `share` fuses a `Some` spec into the broadcast buffer instead of
    /// running a separate buffering stage.
    fn buffer_spec(&self) -> Option<BufferSpec> {
        None
    }

    /// Open the source without its own buffering stage, for consumers that
    /// adopted [`buffer_spec`](ColdSource::buffer_spec).
    fn fused_open(&self) -> BoxSourceStream<Self::Item> {
        self.open()
    }
}

impl<F, S, T> ColdSource for F
where
    F: Fn() -> S + Send + Sync + 'static,
    S: Stream<Item = SourceItem<T>> + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn open(&self) -> BoxSourceStream<T> {
        Box::pin((self)())
    }
}

/// Wrap a stream-producing closure as a cold source.
///
/// This is an identity function that pins down the closure's role for type
/// inference; `f` already implements [`ColdSource`] on its own.
pub fn from_fn<F, S, T>(f: F) -> impl ColdSource<Item = T>
where
    F: Fn() -> S + Send + Sync + 'static,
    S: Stream<Item = SourceItem<T>> + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    f
}

/// A cold source that replays a clonable collection of values.
pub fn iter<I>(items: I) -> impl ColdSource<Item = I::Item>
where
    I: IntoIterator + Clone + Send + Sync + 'static,
    I::IntoIter: Send + 'static,
    I::Item: Clone + Send + Sync + 'static,
{
    move || stream::iter(items.clone()).map(SourceItem::Value)
}

/// A cold source producing a single value.
pub fn once<T>(value: T) -> impl ColdSource<Item = T>
where
    T: Clone + Send + Sync + 'static,
{
    move || stream::once(std::future::ready(SourceItem::Value(value.clone())))
}
