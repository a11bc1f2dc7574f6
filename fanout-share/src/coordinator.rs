// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The per-session control task driving one producer per shared broadcast.

use crate::command::Command;
use crate::logging::{debug, error};
use crate::sharing_policy::SharingPolicy;
use async_trait::async_trait;
use fanout_core::{
    ColdSource, ReplaySubject, SourceItem, StateReader, StateSubject, SubjectError, TaskHandle,
};
use futures::StreamExt;
use std::sync::Arc;

/// The broadcast side of a sharing session, as seen by the coordinator.
///
/// Implemented by [`ReplaySubject`] (plain sharing) and by [`StateSink`]
/// (latest-value sharing, where a reset re-seeds the initial value).
#[async_trait]
pub(crate) trait ShareSink<T: Send>: Send + Sync + 'static {
    async fn emit(&self, value: T) -> Result<(), SubjectError>;
    fn reset(&self);
    fn close(&self);
    fn subscription_count(&self) -> StateReader<usize>;
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> ShareSink<T> for ReplaySubject<T> {
    async fn emit(&self, value: T) -> Result<(), SubjectError> {
        ReplaySubject::emit(self, value).await
    }

    fn reset(&self) {
        self.reset_buffer();
    }

    fn close(&self) {
        ReplaySubject::close(self);
    }

    fn subscription_count(&self) -> StateReader<usize> {
        ReplaySubject::subscription_count(self)
    }
}

/// Latest-value sink: conflated writes, reset re-seeds the initial value.
pub(crate) struct StateSink<T: Clone + PartialEq + Send + Sync + 'static> {
    pub(crate) subject: StateSubject<T>,
    pub(crate) reset_value: T,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Clone for StateSink<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            reset_value: self.reset_value.clone(),
        }
    }
}

#[async_trait]
impl<T: Clone + PartialEq + Send + Sync + 'static> ShareSink<T> for StateSink<T> {
    async fn emit(&self, value: T) -> Result<(), SubjectError> {
        self.subject.set(value).map(|_| ())
    }

    fn reset(&self) {
        self.subject.reset(self.reset_value.clone());
    }

    fn close(&self) {
        self.subject.close();
    }

    fn subscription_count(&self) -> StateReader<usize> {
        self.subject.subscription_count()
    }
}

/// Whether the broadcast adopted the source's own buffering configuration.
///
/// A fused producer opens the source without its buffering stage (the
/// broadcast buffer took its place); an unfused one opens it as-is.
#[derive(Clone, Copy)]
pub(crate) enum Fusion {
    Adopted,
    None,
}

/// Spawn the control task of a sharing session.
///
/// The coordinator consumes the policy's command sequence with latest-wins
/// semantics: a still-running producer is cancelled and awaited before the
/// next command takes effect, so at most one producer exists at any time.
/// When the session is torn down the buffer is reset unconditionally and
/// the subject closed, unblocking parked subscribers.
pub(crate) fn spawn_coordinator<C, K>(
    source: Arc<C>,
    sink: K,
    policy: SharingPolicy,
    fusion: Fusion,
) -> TaskHandle
where
    C: ColdSource,
    K: ShareSink<C::Item> + Clone,
{
    TaskHandle::spawn(move |cancel| async move {
        let mut commands = policy.command_stream(sink.subscription_count());
        let mut producer: Option<TaskHandle> = None;
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                command = commands.next() => {
                    let Some(command) = command else {
                        // Terminal policies (Eagerly, Lazily) run out of
                        // commands; the session lives on until cancelled.
                        cancel.cancelled().await;
                        break;
                    };
                    if let Some(task) = producer.take() {
                        task.stop().await;
                    }
                    match command {
                        Command::Start => {
                            debug!("sharing session: starting producer");
                            producer = Some(spawn_producer(
                                Arc::clone(&source),
                                sink.clone(),
                                fusion,
                            ));
                        }
                        Command::Stop => {
                            debug!("sharing session: producer stopped");
                        }
                        Command::StopAndResetBuffer => {
                            debug!("sharing session: producer stopped, buffer reset");
                            sink.reset();
                        }
                    }
                }
            }
        }
        if let Some(task) = producer.take() {
            task.stop().await;
        }
        sink.reset();
        sink.close();
    })
}

/// Spawn the producer task: drain the opened source into the sink.
///
/// Upstream completion leaves the broadcast subscribable but idle; upstream
/// failure is logged and likewise only silences the broadcast.
fn spawn_producer<C, K>(source: Arc<C>, sink: K, fusion: Fusion) -> TaskHandle
where
    C: ColdSource,
    K: ShareSink<C::Item>,
{
    TaskHandle::spawn(move |cancel| async move {
        let mut stream = match fusion {
            Fusion::Adopted => source.fused_open(),
            Fusion::None => source.open(),
        };
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                item = stream.next() => match item {
                    Some(SourceItem::Value(value)) => {
                        tokio::select! {
                            () = cancel.cancelled() => break,
                            emitted = sink.emit(value) => {
                                if emitted.is_err() {
                                    break;
                                }
                            }
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
    })
}
