// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Adapters turning channel receivers into cold sources.
//!
//! Sharing needs a re-openable recipe, while a channel receiver is a single
//! consumption point; these adapters bridge the two:
//!
//! - An [`async_channel::Receiver`] is clonable, so every producer start
//!   opens a fresh clone and values flow into whichever open is active.
//! - A [`tokio::sync::mpsc::UnboundedReceiver`] is not clonable: the first
//!   open takes it, later opens produce an empty stream (and log a warning
//!   when the `tracing` feature is enabled). Pair it with a policy that
//!   starts at most once, such as `Eagerly` or `Lazily`.

use fanout_core::{BoxSourceStream, ColdSource, SourceItem};
use futures::future::Either;
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;

#[cfg(feature = "tracing")]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        tracing::warn!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn_log {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

/// Conversion of a channel receiver into a [`ColdSource`].
pub trait IntoColdSource {
    /// The value type the resulting source produces.
    type Item: Clone + Send + Sync + 'static;
    /// The concrete source type.
    type Source: ColdSource<Item = Self::Item>;

    /// Consume the receiver, producing a cold source over its values.
    fn into_cold_source(self) -> Self::Source;
}

impl<T: Clone + Send + Sync + 'static> IntoColdSource for async_channel::Receiver<T> {
    type Item = T;
    type Source = ChannelSource<T>;

    fn into_cold_source(self) -> ChannelSource<T> {
        ChannelSource { receiver: self }
    }
}

impl<T: Clone + Send + Sync + 'static> IntoColdSource for tokio::sync::mpsc::UnboundedReceiver<T> {
    type Item = T;
    type Source = UnboundedReceiverSource<T>;

    fn into_cold_source(self) -> UnboundedReceiverSource<T> {
        UnboundedReceiverSource {
            receiver: Arc::new(Mutex::new(Some(self))),
        }
    }
}

/// Cold source over a clonable [`async_channel::Receiver`].
pub struct ChannelSource<T> {
    receiver: async_channel::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> ColdSource for ChannelSource<T> {
    type Item = T;

    fn open(&self) -> BoxSourceStream<T> {
        Box::pin(self.receiver.clone().map(SourceItem::Value))
    }
}

/// Cold source over a [`tokio::sync::mpsc::UnboundedReceiver`]; openable
/// once.
pub struct UnboundedReceiverSource<T> {
    receiver: Arc<Mutex<Option<tokio::sync::mpsc::UnboundedReceiver<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> ColdSource for UnboundedReceiverSource<T> {
    type Item = T;

    fn open(&self) -> BoxSourceStream<T> {
        match self.receiver.lock().take() {
            Some(receiver) => Box::pin(Either::<_, stream::Empty<SourceItem<T>>>::Left(
                UnboundedReceiverStream::new(receiver).map(SourceItem::Value),
            )),
            None => {
                warn_log!("unbounded receiver source opened more than once; producing nothing");
                Box::pin(Either::<stream::Empty<SourceItem<T>>, _>::Right(
                    stream::empty::<SourceItem<T>>(),
                ))
            }
        }
    }
}
