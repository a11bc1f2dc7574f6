// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Convenience re-exports for the common sharing workflow.

pub use crate::channel_ext::IntoColdSource;
pub use fanout_core::{
    BufferOverflow, ColdSource, FanoutError, ReplaySubject, SharedReader, SourceItem, StateReader,
    StateSubject, SubjectError,
};
pub use fanout_share::{state_from_first, Command, ShareExt, SharingPolicy};
