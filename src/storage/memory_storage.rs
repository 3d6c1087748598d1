use crate::{
    domain::{
        Board, BoardId, BoardSnapshot, Column, ColumnId, ColumnUpdate, Ticket, TicketId,
        TicketUpdate,
    },
    error::Result,
    storage::{BoardTables, NewColumn, NewTicket, Storage},
};
use async_trait::async_trait;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Storage that keeps all board data in process memory.
///
/// Suitable for tests, demos and hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: RwLock<BoardTables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with the demo board
    pub fn seeded() -> Self {
        Self::with_tables(BoardTables::seeded())
    }

    pub fn with_tables(tables: BoardTables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        Self::with_tables(BoardTables::from_snapshot(snapshot))
    }

    /// Copy of the current tables
    pub fn tables(&self) -> BoardTables {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, BoardTables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BoardTables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn list_boards(&self) -> Result<Vec<Board>> {
        Ok(self.read().list_boards())
    }

    async fn get_board_data(&self, board_id: &BoardId) -> Result<BoardSnapshot> {
        self.read().snapshot(board_id)
    }

    async fn create_board(&self, name: &str) -> Result<Board> {
        Ok(self.write().create_board(name))
    }

    async fn update_board(&self, id: &BoardId, name: &str) -> Result<Board> {
        self.write().update_board(id, name)
    }

    async fn delete_board(&self, id: &BoardId) -> Result<bool> {
        Ok(self.write().delete_board(id))
    }

    async fn create_column(&self, input: &NewColumn) -> Result<Column> {
        self.write().create_column(input)
    }

    async fn update_column(&self, input: &ColumnUpdate) -> Result<Column> {
        self.write().update_column(input)
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<bool> {
        Ok(self.write().delete_column(id))
    }

    async fn create_ticket(&self, input: &NewTicket) -> Result<Ticket> {
        self.write().create_ticket(input)
    }

    async fn update_ticket(&self, input: &TicketUpdate) -> Result<Ticket> {
        self.write().update_ticket(input)
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<bool> {
        Ok(self.write().delete_ticket(id))
    }
}
