// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core broadcast primitives for the fanout workspace.
//!
//! This crate provides the building blocks that turn a single cold,
//! asynchronous producer into a hot source shared by many subscribers:
//!
//! - [`ReplaySubject`]: a multi-subscriber broadcast with a replay window,
//!   extra buffer capacity and a configurable overflow policy.
//! - [`StateSubject`]: the latest-value specialization (replay of one,
//!   conflation, equality-based suppression of duplicate emissions).
//! - [`SharedReader`] / [`StateReader`]: delegation-based read-only views.
//! - [`ColdSource`]: the minimal "producible sequence" abstraction the
//!   sharing layer iterates, re-openable once per producer start.
//! - [`CancellationToken`] / [`TaskHandle`]: cooperative cancellation and
//!   background task ownership.
//!
//! The sharing coordinator and start/stop policies live in `fanout-share`;
//! this crate is only concerned with the broadcast machinery itself.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

pub mod cancellation_token;
pub mod cold_source;
pub mod config;
pub mod error;
mod replay_buffer;
pub mod replay_subject;
pub mod shared_reader;
pub mod source_item;
pub mod state_reader;
pub mod state_subject;
pub mod subscription;
pub mod task_handle;

pub use self::cancellation_token::CancellationToken;
pub use self::cold_source::{from_fn, iter, once, BoxSourceStream, ColdSource};
pub use self::config::{BufferOverflow, BufferSpec, SharedConfig};
pub use self::error::{FanoutError, Result, SubjectError};
pub use self::replay_subject::ReplaySubject;
pub use self::shared_reader::SharedReader;
pub use self::source_item::SourceItem;
pub use self::state_reader::StateReader;
pub use self::state_subject::StateSubject;
pub use self::subscription::Subscription;
pub use self::task_handle::TaskHandle;
