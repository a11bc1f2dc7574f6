// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fanout_core::ReplaySubject;
use fanout_test_utils::{assert_no_element_emitted, unwrap_stream};

#[tokio::test]
async fn count_signal_replays_the_current_count() {
    // Arrange
    let subject = ReplaySubject::<i32>::new(1);
    let _sub = subject.subscribe().unwrap();

    // Act
    let counts = subject.subscription_count();

    // Assert - the signal starts from the live value
    assert_eq!(counts.value(), 1);
    let mut observed = counts.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut observed, 500).await, 1);
}

#[tokio::test]
async fn every_subscribe_and_drop_is_published() {
    // Arrange
    let subject = ReplaySubject::<i32>::new(1);
    let counts = subject.subscription_count();
    let mut observed = counts.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut observed, 500).await, 0);

    // Act / Assert - each transition published, in order
    let sub1 = subject.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut observed, 500).await, 1);

    let sub2 = subject.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut observed, 500).await, 2);

    drop(sub1);
    assert_eq!(unwrap_stream(&mut observed, 500).await, 1);

    drop(sub2);
    assert_eq!(unwrap_stream(&mut observed, 500).await, 0);
    assert_no_element_emitted(&mut observed, 50).await;
}

#[tokio::test]
async fn snapshot_count_matches_the_signal() {
    // Arrange
    let subject = ReplaySubject::<i32>::new(0);
    let counts = subject.subscription_count();

    // Act
    let sub1 = subject.subscribe().unwrap();
    let sub2 = subject.subscribe().unwrap();

    // Assert
    assert_eq!(subject.subscriber_count(), 2);
    assert_eq!(counts.value(), 2);

    drop(sub1);
    drop(sub2);
    assert_eq!(subject.subscriber_count(), 0);
    assert_eq!(counts.value(), 0);
}

#[tokio::test]
async fn count_observers_do_not_count_as_subscribers() {
    // Arrange
    let subject = ReplaySubject::<i32>::new(0);
    let counts = subject.subscription_count();

    // Act - observing the signal must not disturb the counted set
    let _observed = counts.subscribe().unwrap();

    // Assert
    assert_eq!(subject.subscriber_count(), 0);
    assert_eq!(counts.value(), 0);
}

#[tokio::test]
async fn reader_exposes_the_same_signal() {
    // Arrange
    let subject = ReplaySubject::<i32>::new(0);
    let reader = subject.reader();

    // Act
    let _sub = reader.subscribe().unwrap();

    // Assert
    assert_eq!(reader.subscriber_count(), 1);
    assert_eq!(reader.subscription_count().value(), 1);
}
