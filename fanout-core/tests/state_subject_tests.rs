// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fanout_core::{StateSubject, SubjectError};
use fanout_test_utils::{
    assert_no_element_emitted, assert_stream_ended, person_alice, person_bob, unwrap_stream,
};

#[tokio::test]
async fn holds_the_initial_value_from_construction() {
    let state = StateSubject::new(41);
    assert_eq!(state.value(), 41);
}

#[tokio::test]
async fn set_updates_the_current_value() {
    // Arrange
    let state = StateSubject::new(person_alice());

    // Act
    assert!(state.set(person_bob()).unwrap());

    // Assert
    assert_eq!(state.value(), person_bob());
}

#[tokio::test]
async fn subscriber_receives_current_value_first() {
    // Arrange
    let state = StateSubject::new(7);
    let mut sub = state.subscribe().unwrap();

    // Assert
    assert_eq!(unwrap_stream(&mut sub, 500).await, 7);
    assert_no_element_emitted(&mut sub, 50).await;
}

#[tokio::test]
async fn duplicate_values_are_suppressed() {
    // Arrange
    let state = StateSubject::new(0);
    let mut sub = state.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 0);

    // Act
    assert!(state.set(5).unwrap());
    assert!(!state.set(5).unwrap()); // no-op
    assert!(state.set(6).unwrap());

    // Assert - exactly one delivery per distinct value
    assert_eq!(unwrap_stream(&mut sub, 500).await, 5);
    assert_eq!(unwrap_stream(&mut sub, 500).await, 6);
    assert_no_element_emitted(&mut sub, 50).await;
}

#[tokio::test]
async fn slow_subscriber_observes_only_the_latest_value() {
    // Arrange
    let state = StateSubject::new(0);
    let mut sub = state.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 0);

    // Act - three updates without the subscriber polling in between
    state.set(1).unwrap();
    state.set(2).unwrap();
    state.set(3).unwrap();

    // Assert - conflation: intermediate values were skipped
    assert_eq!(unwrap_stream(&mut sub, 500).await, 3);
    assert_no_element_emitted(&mut sub, 50).await;
}

#[tokio::test]
async fn reset_reinitializes_the_value() {
    // Arrange
    let state = StateSubject::new(0);
    state.set(9).unwrap();
    assert_eq!(state.value(), 9);

    // Act
    state.reset(0);

    // Assert
    assert_eq!(state.value(), 0);
    let mut sub = state.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 0);
}

#[tokio::test]
async fn reset_to_the_held_value_notifies_nobody() {
    // Arrange
    let state = StateSubject::new(4);
    let mut sub = state.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 4);

    // Act
    state.reset(4);

    // Assert
    assert_no_element_emitted(&mut sub, 50).await;
}

#[tokio::test]
async fn existing_subscribers_observe_a_reset_as_an_update() {
    // Arrange
    let state = StateSubject::new(0);
    let mut sub = state.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 0);
    state.set(5).unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 5);

    // Act
    state.reset(0);

    // Assert
    assert_eq!(unwrap_stream(&mut sub, 500).await, 0);
}

#[tokio::test]
async fn close_ends_subscribers_but_keeps_the_value_readable() {
    // Arrange
    let state = StateSubject::new('x');
    let mut sub = state.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 'x');

    // Act
    state.close();

    // Assert
    assert_stream_ended(&mut sub, 500).await;
    assert!(state.is_closed());
    assert_eq!(state.value(), 'x');
    assert!(matches!(state.set('y'), Err(SubjectError::Closed)));
}

#[tokio::test]
async fn reader_exposes_the_read_only_surface() {
    // Arrange
    let state = StateSubject::new(1);
    let reader = state.reader();

    // Act
    state.set(2).unwrap();

    // Assert
    assert_eq!(reader.value(), 2);
    let mut sub = reader.subscribe().unwrap();
    assert_eq!(unwrap_stream(&mut sub, 500).await, 2);
}
