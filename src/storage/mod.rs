use crate::{
    domain::{
        Board, BoardId, BoardSnapshot, Column, ColumnId, ColumnUpdate, Ticket, TicketId,
        TicketUpdate,
    },
    error::Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;
pub mod tables;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::InMemoryStorage;
pub use tables::BoardTables;

/// Input for creating a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewColumn {
    pub board_id: BoardId,
    pub name: String,
    pub position: u32,
}

/// Input for creating a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub position: u32,
}

/// The data API the board view talks to.
///
/// Every call applies all of its field changes or none of them. Calls never
/// renumber siblings on their own; keeping positions dense is up to the
/// caller.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Checks if the storage backend is ready to serve reads
    async fn is_initialized(&self) -> bool {
        true
    }

    /// Lists every board, oldest first
    async fn list_boards(&self) -> Result<Vec<Board>>;

    /// Reads a board together with all of its columns and tickets
    async fn get_board_data(&self, board_id: &BoardId) -> Result<BoardSnapshot>;

    async fn create_board(&self, name: &str) -> Result<Board>;

    async fn update_board(&self, id: &BoardId, name: &str) -> Result<Board>;

    /// Deletes a board, its columns and their tickets
    async fn delete_board(&self, id: &BoardId) -> Result<bool>;

    async fn create_column(&self, input: &NewColumn) -> Result<Column>;

    async fn update_column(&self, input: &ColumnUpdate) -> Result<Column>;

    /// Deletes a column and its tickets
    async fn delete_column(&self, id: &ColumnId) -> Result<bool>;

    async fn create_ticket(&self, input: &NewTicket) -> Result<Ticket>;

    async fn update_ticket(&self, input: &TicketUpdate) -> Result<Ticket>;

    async fn delete_ticket(&self, id: &TicketId) -> Result<bool>;
}
