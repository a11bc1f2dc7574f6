// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Sharing layer for the fanout workspace.
//!
//! This crate turns a [`ColdSource`](fanout_core::ColdSource) into a running
//! hot broadcast: a [`SharingPolicy`] maps the live subscriber-count signal
//! to a sequence of [`Command`]s, and the sharing coordinator starts and
//! cancels the single producer task accordingly.
//!
//! The entry points live on the [`ShareExt`] extension trait:
//!
//! - [`share`](ShareExt::share): broadcast with a replay window, returning a
//!   [`SharedReader`](fanout_core::SharedReader).
//! - [`state`](ShareExt::state): latest-value broadcast seeded with an
//!   initial value, returning a [`StateReader`](fanout_core::StateReader).
//! - [`state_from_first`]: eager latest-value broadcast that suspends the
//!   caller until the first value has been produced.
//!
//! A directly-chained [`Buffered`] wrapper is fused into the broadcast
//! buffer instead of running as a separate stage.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

pub mod buffered;
pub mod command;
mod coordinator;
mod logging;
pub mod share;
pub mod sharing_policy;

pub use self::buffered::Buffered;
pub use self::command::Command;
pub use self::share::{state_from_first, ShareExt, DEFAULT_EXTRA_CAPACITY};
pub use self::sharing_policy::SharingPolicy;
