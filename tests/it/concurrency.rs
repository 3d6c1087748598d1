//! Gesture queueing and optimistic rendering while writes are in flight.

use crate::helpers::{columns_only, update, Call, RecordingStorage, BOARD};
use kanboard_core::{
    sync::RefreshOutcome, BoardId, ColumnId, Gesture, KanboardError, ReconciliationClient,
};
use std::sync::Arc;

fn column_move(id: &str, from: usize, to: usize) -> Gesture {
    Gesture::Column {
        column_id: ColumnId::from(id),
        source_index: from,
        destination_index: to,
    }
}

#[tokio::test]
async fn test_second_gesture_waits_for_first_to_settle() -> anyhow::Result<()> {
    let storage = Arc::new(RecordingStorage::new(columns_only(&["A", "B", "C"])));
    let client = ReconciliationClient::new(Arc::clone(&storage), BoardId::from(BOARD));
    client.load().await?;
    storage.clear();

    let first = column_move("A", 0, 2);
    // planned against the order the first gesture produces
    let second = column_move("B", 0, 1);
    let (a, b) = tokio::join!(client.submit(&first), client.submit(&second));

    assert_eq!(a?.issued, 3);
    assert_eq!(b?.issued, 2);
    assert_eq!(
        storage.calls(),
        vec![
            update("B"),
            update("C"),
            update("A"),
            Call::Refresh,
            update("C"),
            update("B"),
            Call::Refresh,
        ]
    );

    let view = client.view_model().render().expect("board loaded");
    assert_eq!(view.column_ids(), vec!["C", "B", "A"]);
    Ok(())
}

#[tokio::test]
async fn test_optimistic_order_survives_poll_during_flight() -> anyhow::Result<()> {
    let storage = Arc::new(RecordingStorage::throttled(columns_only(&["A", "B", "C"])));
    let client = Arc::new(ReconciliationClient::new(
        Arc::clone(&storage),
        BoardId::from(BOARD),
    ));
    client.load().await?;

    let task = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.submit(&column_move("C", 2, 0)).await })
    };
    while !client.view_model().is_pending() {
        tokio::task::yield_now().await;
    }

    let view = client.view_model().render().expect("board loaded");
    assert_eq!(view.column_ids(), vec!["C", "A", "B"]);

    // a poll sees the untouched server order but must not repaint it
    assert_eq!(client.poll_once().await?, RefreshOutcome::Deferred);
    let view = client.view_model().render().expect("board loaded");
    assert_eq!(view.column_ids(), vec!["C", "A", "B"]);

    storage.release(3);
    let settlement = task.await??;

    assert_eq!(settlement.issued, 3);
    assert!(!client.view_model().is_pending());
    let view = client.view_model().render().expect("board loaded");
    assert_eq!(view.column_ids(), vec!["C", "A", "B"]);
    Ok(())
}

#[tokio::test]
async fn test_slow_poll_does_not_undo_settled_move() -> anyhow::Result<()> {
    let storage = Arc::new(RecordingStorage::new(columns_only(&["A", "B", "C"])));
    let client = Arc::new(ReconciliationClient::new(
        Arc::clone(&storage),
        BoardId::from(BOARD),
    ));
    client.load().await?;
    storage.clear();

    // the poll reads the board as it is now, then stalls
    let release = storage.hold_next_read();
    let poll = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.poll_once().await })
    };
    while storage.refresh_count() == 0 {
        tokio::task::yield_now().await;
    }

    client.submit(&column_move("C", 2, 0)).await?;
    let view = client.view_model().render().expect("board loaded");
    assert_eq!(view.column_ids(), vec!["C", "A", "B"]);

    release.add_permits(1);
    assert_eq!(poll.await??, RefreshOutcome::Stale);

    let view = client.view_model().render().expect("board loaded");
    assert_eq!(view.column_ids(), vec!["C", "A", "B"]);

    // the next poll is current again
    assert_eq!(client.poll_once().await?, RefreshOutcome::Applied);
    Ok(())
}

#[tokio::test]
async fn test_submit_before_load_is_rejected() -> anyhow::Result<()> {
    let storage = Arc::new(RecordingStorage::new(columns_only(&["A", "B"])));
    let client = ReconciliationClient::new(Arc::clone(&storage), BoardId::from("elsewhere"));

    // the board never loaded, so there is nothing to plan against
    let err = client.submit(&column_move("A", 0, 1)).await.unwrap_err();
    assert!(matches!(err, KanboardError::BoardNotLoaded));
    assert!(storage.mutation_calls().is_empty());
    Ok(())
}
