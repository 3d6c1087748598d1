//! Shared fixtures: board builders and a call-recording storage wrapper.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kanboard_core::{
    domain::{ColumnUpdate, TicketUpdate},
    storage::{NewColumn, NewTicket},
    Board, BoardId, BoardSnapshot, Column, ColumnId, InMemoryStorage, KanboardError,
    ReconciliationClient, Result, Storage, Ticket, TicketId,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tokio::sync::Semaphore;

pub const BOARD: &str = "board";

fn created(offset: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + offset, 0).unwrap()
}

/// A board whose columns are `columns`, in order, each holding the given
/// tickets in order. Positions are dense and creation times increase
/// with declaration order.
pub fn board(columns: &[(&str, &[&str])]) -> BoardSnapshot {
    let board = Board::new("Test board".to_string()).with_id(BoardId::from(BOARD));
    let mut clock = 0;
    let mut all_columns = Vec::new();
    let mut all_tickets = Vec::new();

    for (column_position, (column_id, tickets)) in columns.iter().enumerate() {
        clock += 1;
        all_columns.push(
            Column::new(board.id.clone(), column_id.to_string(), column_position as u32)
                .with_id(ColumnId::from(*column_id))
                .with_created_at(created(clock)),
        );
        for (ticket_position, ticket_id) in tickets.iter().enumerate() {
            clock += 1;
            all_tickets.push(
                Ticket::new(
                    ColumnId::from(*column_id),
                    ticket_id.to_string(),
                    ticket_position as u32,
                )
                .with_id(TicketId::from(*ticket_id))
                .with_created_at(created(clock)),
            );
        }
    }

    BoardSnapshot::new(board, all_columns, all_tickets)
}

/// A board with empty columns
pub fn columns_only(ids: &[&str]) -> BoardSnapshot {
    let columns: Vec<(&str, &[&str])> = ids.iter().map(|id| (*id, &[] as &[&str])).collect();
    board(&columns)
}

/// One observed request against the data API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Update(String),
    Create(String),
    Delete(String),
    Refresh,
}

pub fn update(id: &str) -> Call {
    Call::Update(id.to_string())
}

/// Storage wrapper that records every call, can fail the n-th mutating
/// call, and can hold mutations until permits are released.
pub struct RecordingStorage {
    inner: InMemoryStorage,
    log: Mutex<Vec<Call>>,
    mutations: AtomicUsize,
    fail_at: Mutex<Option<usize>>,
    throttle: Option<Semaphore>,
    held_read: Mutex<Option<Arc<Semaphore>>>,
}

impl RecordingStorage {
    pub fn new(snapshot: BoardSnapshot) -> Self {
        Self {
            inner: InMemoryStorage::from_snapshot(snapshot),
            log: Mutex::new(Vec::new()),
            mutations: AtomicUsize::new(0),
            fail_at: Mutex::new(None),
            throttle: None,
            held_read: Mutex::new(None),
        }
    }

    /// Mutations wait for a permit from [`RecordingStorage::release`]
    pub fn throttled(snapshot: BoardSnapshot) -> Self {
        Self {
            throttle: Some(Semaphore::new(0)),
            ..Self::new(snapshot)
        }
    }

    pub fn release(&self, permits: usize) {
        if let Some(throttle) = &self.throttle {
            throttle.add_permits(permits);
        }
    }

    /// The next board read takes its data immediately but does not return
    /// until a permit is added to the returned semaphore
    pub fn hold_next_read(&self) -> Arc<Semaphore> {
        let release = Arc::new(Semaphore::new(0));
        *self.held_read.lock().unwrap() = Some(Arc::clone(&release));
        release
    }

    /// Fails the `n`-th mutating call (1-based) counted from now
    pub fn fail_mutation(&self, n: usize) {
        let base = self.mutations.load(Ordering::SeqCst);
        *self.fail_at.lock().unwrap() = Some(base + n);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn refresh_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Refresh).count()
    }

    pub fn mutation_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| *c != Call::Refresh)
            .collect()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.inner
            .tables()
            .snapshot(&BoardId::from(BOARD))
            .expect("board exists")
    }

    async fn mutation(&self, call: Call) -> Result<()> {
        if let Some(throttle) = &self.throttle {
            throttle
                .acquire()
                .await
                .map_err(|e| KanboardError::StorageError(e.to_string()))?
                .forget();
        }
        tokio::task::yield_now().await;

        self.log.lock().unwrap().push(call);
        let count = self.mutations.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_at.lock().unwrap() == Some(count) {
            return Err(KanboardError::StorageError("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn list_boards(&self) -> Result<Vec<Board>> {
        self.inner.list_boards().await
    }

    async fn get_board_data(&self, board_id: &BoardId) -> Result<BoardSnapshot> {
        tokio::task::yield_now().await;
        let hold = self.held_read.lock().unwrap().take();
        self.log.lock().unwrap().push(Call::Refresh);
        let snapshot = self.inner.get_board_data(board_id).await;

        if let Some(release) = hold {
            release
                .acquire()
                .await
                .map_err(|e| KanboardError::StorageError(e.to_string()))?
                .forget();
        }
        snapshot
    }

    async fn create_board(&self, name: &str) -> Result<Board> {
        self.mutation(Call::Create(name.to_string())).await?;
        self.inner.create_board(name).await
    }

    async fn update_board(&self, id: &BoardId, name: &str) -> Result<Board> {
        self.mutation(Call::Update(id.to_string())).await?;
        self.inner.update_board(id, name).await
    }

    async fn delete_board(&self, id: &BoardId) -> Result<bool> {
        self.mutation(Call::Delete(id.to_string())).await?;
        self.inner.delete_board(id).await
    }

    async fn create_column(&self, input: &NewColumn) -> Result<Column> {
        self.mutation(Call::Create(input.name.clone())).await?;
        self.inner.create_column(input).await
    }

    async fn update_column(&self, input: &ColumnUpdate) -> Result<Column> {
        self.mutation(Call::Update(input.id.to_string())).await?;
        self.inner.update_column(input).await
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<bool> {
        self.mutation(Call::Delete(id.to_string())).await?;
        self.inner.delete_column(id).await
    }

    async fn create_ticket(&self, input: &NewTicket) -> Result<Ticket> {
        self.mutation(Call::Create(input.title.clone())).await?;
        self.inner.create_ticket(input).await
    }

    async fn update_ticket(&self, input: &TicketUpdate) -> Result<Ticket> {
        self.mutation(Call::Update(input.id.to_string())).await?;
        self.inner.update_ticket(input).await
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<bool> {
        self.mutation(Call::Delete(id.to_string())).await?;
        self.inner.delete_ticket(id).await
    }
}

/// A loaded client over a recording storage, with the load call cleared
pub async fn client(
    snapshot: BoardSnapshot,
) -> anyhow::Result<(Arc<ReconciliationClient<RecordingStorage>>, Arc<RecordingStorage>)> {
    let storage = Arc::new(RecordingStorage::new(snapshot));
    let client = Arc::new(ReconciliationClient::new(
        Arc::clone(&storage),
        BoardId::from(BOARD),
    ));
    client.load().await?;
    storage.clear();
    Ok((client, storage))
}

/// Column ids in stored order
pub fn stored_columns(snapshot: &BoardSnapshot) -> Vec<String> {
    snapshot
        .ordered_columns()
        .into_iter()
        .map(|c| c.id.to_string())
        .collect()
}

/// `(ticket id, position)` pairs of one column in stored order
pub fn stored_tickets(snapshot: &BoardSnapshot, column: &str) -> Vec<(String, u32)> {
    snapshot
        .ordered_tickets(&ColumnId::from(column))
        .into_iter()
        .map(|t| (t.id.to_string(), t.position))
        .collect()
}

/// Asserts that every group on the board holds positions `0..n`
pub fn assert_dense(snapshot: &BoardSnapshot) {
    let positions: Vec<u32> = snapshot
        .ordered_columns()
        .iter()
        .map(|c| c.position)
        .collect();
    assert_eq!(positions, (0..positions.len() as u32).collect::<Vec<_>>());

    for column in snapshot.ordered_columns() {
        let positions: Vec<u32> = snapshot
            .ordered_tickets(&column.id)
            .iter()
            .map(|t| t.position)
            .collect();
        assert_eq!(
            positions,
            (0..positions.len() as u32).collect::<Vec<_>>(),
            "column {} is not dense",
            column.id
        );
    }
}
