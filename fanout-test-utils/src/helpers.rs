// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Await the next stream element, panicking when the stream ends or the
/// timeout elapses first.
pub async fn unwrap_stream<S, T>(stream: &mut S, timeout_ms: u64) -> T
where
    S: Stream<Item = T> + Unpin,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(Some(value)) => value,
        Ok(None) => panic!("stream ended unexpectedly"),
        Err(_) => panic!("timed out after {timeout_ms}ms waiting for a stream element"),
    }
}

/// Assert that the stream ends (yields `None`) within the timeout.
pub async fn assert_stream_ended<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    match timeout(Duration::from_millis(timeout_ms), stream.next()).await {
        Ok(None) => {}
        Ok(Some(_)) => panic!("expected the stream to end, but it emitted an element"),
        Err(_) => panic!("timed out after {timeout_ms}ms waiting for the stream to end"),
    }
}

/// Assert that no element arrives within the timeout.
pub async fn assert_no_element_emitted<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        _ = stream.next() => panic!("unexpected element emitted, expected no output"),
        () = sleep(Duration::from_millis(timeout_ms)) => {}
    }
}

/// Poll `condition` until it holds, panicking after 2 seconds.
///
/// Sleeps between polls so that spawned tasks get to make progress on a
/// current-thread runtime.
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..2000 {
        if condition() {
            return;
        }
        sleep(Duration::from_millis(1)).await;
    }
    panic!("condition did not hold within 2s");
}
