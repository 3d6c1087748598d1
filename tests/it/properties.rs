//! Order properties checked over many generated gestures.

use crate::helpers::{assert_dense, board, client, columns_only, Call, RecordingStorage};
use kanboard_core::{
    BoardSnapshot, ColumnId, EntityUpdate, Gesture, KanboardError, Location, PositionList,
    ReconciliationClient, ReorderPlanner,
};
use std::sync::Arc;

/// Small deterministic generator so failures reproduce
struct Lcg(u64);

impl Lcg {
    fn below(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

/// A valid gesture for the current state, or `None` if the picked source
/// column is empty
fn random_gesture(snapshot: &BoardSnapshot, rng: &mut Lcg) -> Option<Gesture> {
    let columns = snapshot.ordered_columns();

    if rng.below(4) == 0 {
        let source_index = rng.below(columns.len());
        return Some(Gesture::Column {
            column_id: columns[source_index].id.clone(),
            source_index,
            destination_index: rng.below(columns.len()),
        });
    }

    let source = &columns[rng.below(columns.len())];
    let tickets = snapshot.ordered_tickets(&source.id);
    if tickets.is_empty() {
        return None;
    }
    let source_index = rng.below(tickets.len());
    let destination = &columns[rng.below(columns.len())];
    let destination_len = snapshot.ordered_tickets(&destination.id).len();
    let destination_index = if destination.id == source.id {
        rng.below(destination_len)
    } else {
        rng.below(destination_len + 1)
    };

    Some(Gesture::Ticket {
        ticket_id: tickets[source_index].id.clone(),
        source: Location::new(source.id.clone(), source_index),
        destination: Location::new(destination.id.clone(), destination_index),
    })
}

fn sample_board() -> BoardSnapshot {
    board(&[
        ("todo", &["t1", "t2", "t3", "t4"]),
        ("doing", &["t5"]),
        ("review", &[]),
        ("done", &["t6", "t7", "t8"]),
    ])
}

#[tokio::test]
async fn test_positions_stay_dense_after_any_gesture() -> anyhow::Result<()> {
    let (client, storage) = client(sample_board()).await?;
    let mut rng = Lcg(7);

    for _ in 0..200 {
        let snapshot = storage.snapshot();
        let Some(gesture) = random_gesture(&snapshot, &mut rng) else {
            continue;
        };
        client.submit(&gesture).await?;

        let stored = storage.snapshot();
        assert_dense(&stored);
        assert_eq!(stored.tickets.len(), 8);
        // the optimistic and settled views agree once the writes land
        assert_eq!(
            client.view_model().render().map(|v| v.column_ids().len()),
            Some(4)
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_same_group_move_writes_span_only() -> anyhow::Result<()> {
    let snapshot = columns_only(&["c0", "c1", "c2", "c3", "c4", "c5"]);
    let columns = snapshot.ordered_columns();

    for i in 0..columns.len() {
        for j in 0..columns.len() {
            let write_set = ReorderPlanner::plan(
                &snapshot,
                &Gesture::Column {
                    column_id: columns[i].id.clone(),
                    source_index: i,
                    destination_index: j,
                },
            )?;

            let expected = if i == j { 0 } else { i.abs_diff(j) + 1 };
            assert_eq!(write_set.len(), expected, "move {i} -> {j}");

            let (lo, hi) = (i.min(j), i.max(j));
            for update in write_set.iter() {
                let position = update.new_position().expect("position write") as usize;
                assert!((lo..=hi).contains(&position));
            }
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_cross_group_move_relocates_only_the_moved_ticket() -> anyhow::Result<()> {
    let mut snapshot = sample_board();
    let mut rng = Lcg(42);
    let mut checked = 0;

    while checked < 100 {
        let Some(gesture) = random_gesture(&snapshot, &mut rng) else {
            continue;
        };
        let Gesture::Ticket {
            ticket_id,
            source,
            destination,
        } = &gesture
        else {
            continue;
        };
        if source.group == destination.group {
            continue;
        }

        let write_set = ReorderPlanner::plan(&snapshot, &gesture)?;
        let relocations: Vec<_> = write_set
            .iter()
            .filter_map(|update| match update {
                EntityUpdate::Ticket(t) => t.column_id.as_ref().map(|c| (&t.id, c)),
                EntityUpdate::Column(_) => None,
            })
            .collect();
        assert_eq!(relocations, vec![(ticket_id, &destination.group)]);

        write_set.apply_to(&mut snapshot);
        assert_dense(&snapshot);
        checked += 1;
    }
    Ok(())
}

#[tokio::test]
async fn test_noop_at_every_index() -> anyhow::Result<()> {
    let (client, storage) = client(board(&[("todo", &["t1", "t2", "t3"])])).await?;
    let snapshot = storage.snapshot();

    for (index, ticket) in snapshot
        .ordered_tickets(&ColumnId::from("todo"))
        .iter()
        .enumerate()
    {
        let location = Location::new(ColumnId::from("todo"), index);
        let gesture = Gesture::Ticket {
            ticket_id: ticket.id.clone(),
            source: location.clone(),
            destination: location,
        };
        assert!(ReorderPlanner::plan(&snapshot, &gesture)?.is_empty());
        assert_eq!(client.submit(&gesture).await?.issued, 0);
    }

    assert!(storage.calls().is_empty());
    Ok(())
}

#[test]
fn test_renumbering_dense_list_changes_nothing() {
    let snapshot = sample_board();
    for column in snapshot.ordered_columns() {
        let list = PositionList::from_members(&snapshot.ticket_members(&column.id));
        assert!(list.changes().unwrap().is_empty());

        let once = list.renumbered().unwrap();
        let positions: Vec<u32> = once.iter().map(|(_, p)| *p).collect();
        assert_eq!(positions, (0..list.len() as u32).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn test_failure_at_every_step_stops_and_refreshes_once() -> anyhow::Result<()> {
    let gesture = Gesture::Column {
        column_id: ColumnId::from("c0"),
        source_index: 0,
        destination_index: 4,
    };
    let total = 5;

    for k in 1..=total {
        let storage = Arc::new(RecordingStorage::new(columns_only(&[
            "c0", "c1", "c2", "c3", "c4",
        ])));
        let client = ReconciliationClient::new(Arc::clone(&storage), storage.snapshot().board.id);
        client.load().await?;
        storage.clear();
        storage.fail_mutation(k);

        let err = client.submit(&gesture).await.unwrap_err();

        assert!(matches!(
            err,
            KanboardError::PersistenceCallFailed { step, total: t, .. } if step == k && t == total
        ));
        assert_eq!(storage.mutation_calls().len(), k);
        assert_eq!(storage.refresh_count(), 1);
        assert_eq!(storage.calls().last(), Some(&Call::Refresh));
        assert!(!client.view_model().is_pending());
    }
    Ok(())
}
