// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Control command emitted by a [`SharingPolicy`](crate::SharingPolicy) to
/// drive the producer task of a sharing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start (or restart) draining the upstream source into the broadcast.
    Start,
    /// Cancel the active producer; buffered values remain available.
    Stop,
    /// Cancel the active producer and reset the broadcast buffer.
    StopAndResetBuffer,
}
