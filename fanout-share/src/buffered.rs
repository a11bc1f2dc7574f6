// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Transparent buffering wrapper around a cold source.
//!
//! [`Buffered`] carries a capacity and overflow policy alongside the source
//! it wraps. When the wrapped source is shared, `share` recognizes the
//! wrapper through [`ColdSource::buffer_spec`] and fuses the configuration
//! into the broadcast buffer instead of running a separate stage. When the
//! wrapped source is opened directly, an honest bounded-channel stage
//! applies the same buffering between a pump task and the consumer.

use fanout_core::{BoxSourceStream, BufferOverflow, BufferSpec, ColdSource, SourceItem, TaskHandle};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

/// A cold source annotated with buffer capacity and overflow policy.
///
/// Built with [`ShareExt::buffered`](crate::ShareExt::buffered).
pub struct Buffered<C> {
    inner: C,
    spec: BufferSpec,
}

impl<C: ColdSource> Buffered<C> {
    /// Annotate `inner` with a buffer of `capacity` slots and the given
    /// overflow policy.
    pub fn new(inner: C, capacity: usize, overflow: BufferOverflow) -> Self {
        Self {
            inner,
            spec: BufferSpec { capacity, overflow },
        }
    }
}

impl<C: ColdSource> ColdSource for Buffered<C> {
    type Item = C::Item;

    fn open(&self) -> BoxSourceStream<C::Item> {
        // Bounded channels need at least one slot; a zero-capacity spec
        // degrades to a single-slot stage when consumed unfused.
        let (tx, rx) = async_channel::bounded(self.spec.capacity.max(1));
        let steal = rx.clone();
        let overflow = self.spec.overflow;
        let mut upstream = self.inner.open();

        let task = TaskHandle::spawn(move |cancel| async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    item = upstream.next() => {
                        let Some(item) = item else { break };
                        match overflow {
                            BufferOverflow::Suspend => {
                                tokio::select! {
                                    () = cancel.cancelled() => break,
                                    sent = tx.send(item) => {
                                        if sent.is_err() {
                                            break;
                                        }
                                    }
                                }
                            }
                            BufferOverflow::DropOldest => {
                                let mut pending = item;
                                loop {
                                    match tx.try_send(pending) {
                                        Ok(()) => break,
                                        Err(async_channel::TrySendError::Full(returned)) => {
                                            // Evict the oldest buffered item.
                                            let _ = steal.try_recv();
                                            pending = returned;
                                        }
                                        Err(async_channel::TrySendError::Closed(_)) => return,
                                    }
                                }
                            }
                            BufferOverflow::DropLatest => {
                                match tx.try_send(item) {
                                    Ok(()) | Err(async_channel::TrySendError::Full(_)) => {}
                                    Err(async_channel::TrySendError::Closed(_)) => return,
                                }
                            }
                        }
                    }
                }
            }
        });

        Box::pin(BufferedStream {
            receiver: rx,
            _task: task,
        })
    }

    fn buffer_spec(&self) -> Option<BufferSpec> {
        Some(self.spec)
    }

    fn fused_open(&self) -> BoxSourceStream<C::Item> {
        // The consumer adopted the buffer configuration; no second stage.
        self.inner.open()
    }
}

struct BufferedStream<T> {
    receiver: async_channel::Receiver<SourceItem<T>>,
    _task: TaskHandle,
}

impl<T> Stream for BufferedStream<T> {
    type Item = SourceItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // `async_channel::Receiver` is `!Unpin`; `BufferedStream` is always
        // heap-pinned (`Box::pin`) and the receiver is never moved out, so
        // project the pin onto the receiver field.
        let this = unsafe { self.get_unchecked_mut() };
        let receiver = unsafe { Pin::new_unchecked(&mut this.receiver) };
        receiver.poll_next(cx)
    }
}
