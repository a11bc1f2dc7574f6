// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fanout_core::{BufferOverflow, ColdSource, FanoutError, SourceItem};
use fanout_share::{ShareExt, SharingPolicy};
use fanout_test_utils::{assert_no_element_emitted, eventually, test_channel, unwrap_stream};
use futures::{stream, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::yield_now;

/// 200 sequential values, counting how many the producer has pulled.
fn counted_range_source(pulled: Arc<AtomicUsize>) -> impl ColdSource<Item = u32> {
    move || {
        let pulled = Arc::clone(&pulled);
        stream::iter(0..200u32).map(move |i| {
            pulled.fetch_add(1, Ordering::SeqCst);
            SourceItem::Value(i)
        })
    }
}

#[tokio::test]
async fn default_capacity_paces_the_producer_in_batches() {
    // Arrange - replay of zero plus the default 64 extra suspending slots:
    // the producer parks after 65 emitted-but-undelivered values (the
    // buffer plus the parked emission itself) and resumes only once the
    // subscriber has fully caught up.
    let pulled = Arc::new(AtomicUsize::new(0));
    let shared = counted_range_source(Arc::clone(&pulled))
        .share(0, SharingPolicy::Eagerly)
        .unwrap();
    let mut sub = shared.subscribe().unwrap();

    // Act / Assert - first batch
    eventually(|| pulled.load(Ordering::SeqCst) == 65).await;
    for _ in 0..20 {
        yield_now().await;
    }
    assert_eq!(pulled.load(Ordering::SeqCst), 65);
    for expected in 0..65u32 {
        assert_eq!(unwrap_stream(&mut sub, 1000).await, expected);
    }

    // Second batch
    eventually(|| pulled.load(Ordering::SeqCst) == 130).await;
    for expected in 65..130u32 {
        assert_eq!(unwrap_stream(&mut sub, 1000).await, expected);
    }

    // Third batch
    eventually(|| pulled.load(Ordering::SeqCst) == 195).await;
    for expected in 130..195u32 {
        assert_eq!(unwrap_stream(&mut sub, 1000).await, expected);
    }

    // Tail - the source runs dry
    eventually(|| pulled.load(Ordering::SeqCst) == 200).await;
    for expected in 195..200u32 {
        assert_eq!(unwrap_stream(&mut sub, 1000).await, expected);
    }
    assert_no_element_emitted(&mut sub, 50).await;
}

#[tokio::test]
async fn chained_buffer_configuration_is_fused_into_the_broadcast() {
    // Arrange - the buffered wrapper's capacity and policy replace the
    // default share buffer instead of adding a second stage
    let (tx, rx) = test_channel::<u32>();
    let pulled = Arc::new(AtomicUsize::new(0));
    let source = {
        let pulled = Arc::clone(&pulled);
        move || {
            let pulled = Arc::clone(&pulled);
            rx.clone().map(move |v| {
                pulled.fetch_add(1, Ordering::SeqCst);
                SourceItem::Value(v)
            })
        }
    };
    let shared = source
        .buffered(2, BufferOverflow::DropOldest)
        .share(0, SharingPolicy::Eagerly)
        .unwrap();
    let mut sub = shared.subscribe().unwrap();

    // Act - five values without the subscriber draining; a suspending
    // buffer would park the producer, the fused DropOldest keeps it running
    for value in 1..=5u32 {
        tx.send(value).await.unwrap();
    }
    eventually(|| pulled.load(Ordering::SeqCst) == 5).await;

    // Assert - only the two most recent values survived
    assert_eq!(unwrap_stream(&mut sub, 500).await, 4);
    assert_eq!(unwrap_stream(&mut sub, 500).await, 5);
    assert_no_element_emitted(&mut sub, 50).await;
}

#[tokio::test]
async fn unfused_buffered_source_still_buffers_on_its_own() {
    // Arrange - consumed directly, the wrapper provides a real stage
    let source = fanout_core::iter(0..10u32).buffered(3, BufferOverflow::Suspend);

    // Act
    let mut opened = source.open();

    // Assert - all values flow through the stage in order
    for expected in 0..10u32 {
        match opened.next().await {
            Some(SourceItem::Value(v)) => assert_eq!(v, expected),
            other => panic!("expected a value, got {other:?}"),
        }
    }
    assert!(opened.next().await.is_none());
}

#[tokio::test]
async fn invalid_fused_configuration_is_rejected() {
    // Arrange
    let source = fanout_core::iter([1, 2, 3]).buffered(0, BufferOverflow::DropOldest);

    // Act
    let result = source.share(0, SharingPolicy::Eagerly);

    // Assert
    assert!(matches!(
        result,
        Err(FanoutError::ConfigurationError { .. })
    ));
}
