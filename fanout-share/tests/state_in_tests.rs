// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fanout_core::{FanoutError, SourceItem};
use fanout_share::{state_from_first, ShareExt, SharingPolicy};
use fanout_test_utils::{
    assert_no_element_emitted, eventually, test_channel, test_channel_with_errors, unwrap_stream,
};
use futures::{stream, StreamExt};
use std::time::Duration;
use tokio::task::yield_now;

#[tokio::test]
async fn state_tracks_the_latest_value() {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let source = move || rx.clone().map(SourceItem::Value);
    let state = source.state(0, SharingPolicy::Eagerly);

    let mut sub = state.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 0); // initial value

    // Act
    tx.send(1).await.unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 1);
    tx.send(2).await.unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 2);

    // Assert
    assert_eq!(state.value(), 2);
}

#[tokio::test]
async fn duplicate_upstream_values_do_not_renotify() {
    // Arrange
    let (tx, rx) = test_channel::<&'static str>();
    let source = move || rx.clone().map(SourceItem::Value);
    let state = source.state("init", SharingPolicy::Eagerly);

    let mut sub = state.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, "init");

    // Act
    tx.send("a").await.unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, "a");
    tx.send("a").await.unwrap(); // suppressed

    // Assert
    assert_no_element_emitted(&mut sub, 50).await;
    tx.send("b").await.unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, "b");
}

#[tokio::test(start_paused = true)]
async fn state_resets_to_the_initial_value_after_expiration() {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let source = move || rx.clone().map(SourceItem::Value);
    let policy = SharingPolicy::WhileSubscribed {
        stop_timeout: Duration::ZERO,
        replay_expiration: Duration::from_millis(50),
    };
    let state = source.state(0, policy);

    let mut sub = state.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 0);
    tx.send(7).await.unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 7);
    assert_eq!(state.value(), 7);

    // Act - last subscriber leaves; stop fires, then the expiration
    drop(sub);
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Assert
    assert_eq!(state.value(), 0);
}

#[tokio::test]
async fn state_from_first_suspends_until_the_first_value() {
    // Arrange
    let (tx, rx) = test_channel::<&'static str>();
    let source = move || rx.clone().map(SourceItem::Value);

    // Act
    let pending = tokio::spawn(state_from_first(source));
    for _ in 0..20 {
        yield_now().await;
    }
    assert!(!pending.is_finished());

    tx.send("A").await.unwrap();
    let state = pending.await.unwrap().unwrap();

    // Assert - the caller resumed with the first value already resident
    assert_eq!(state.value(), "A");

    // A repeated emission of the same value does not change the signal
    let mut sub = state.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, "A");
    tx.send("A").await.unwrap();
    assert_no_element_emitted(&mut sub, 50).await;
    tx.send("B").await.unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, "B");
}

#[tokio::test]
async fn state_from_first_keeps_following_the_source() {
    // Arrange
    let (tx, rx) = test_channel::<i32>();
    let source = move || rx.clone().map(SourceItem::Value);

    tx.send(1).await.unwrap();
    let state = state_from_first(source).await.unwrap();
    assert_eq!(state.value(), 1);

    // Act
    tx.send(2).await.unwrap();

    // Assert
    eventually(|| state.value() == 2).await;
}

#[tokio::test]
async fn state_from_first_errors_when_the_source_completes_empty() {
    // Arrange
    let source = || stream::empty::<SourceItem<i32>>();

    // Act
    let result = state_from_first(source).await;

    // Assert
    assert!(matches!(
        result,
        Err(FanoutError::StreamProcessingError { .. })
    ));
}

#[tokio::test]
async fn state_from_first_propagates_an_upstream_failure() {
    // Arrange
    let (tx, rx) = test_channel_with_errors::<i32>();
    let source = move || rx.clone();

    tx.send(SourceItem::Error(FanoutError::stream_error("boom")))
        .await
        .unwrap();

    // Act
    let result = state_from_first(source).await;

    // Assert
    assert!(result.is_err());
}
