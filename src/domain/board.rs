use crate::domain::id::entity_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_id!(
    /// Unique identifier for a board
    BoardId
);

entity_id!(
    /// Unique identifier for a column
    ColumnId
);

/// A kanban board. Owns its columns by reference: columns point at the
/// board through `board_id`, the board never embeds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn new(name: String) -> Self {
        Self {
            id: BoardId::new_v4(),
            name,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: BoardId) -> Self {
        self.id = id;
        self
    }
}

/// A column on a board. `position` is unique and dense among the columns
/// sharing the same `board_id` once all pending writes have completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub name: String,
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

impl Column {
    pub fn new(board_id: BoardId, name: String, position: u32) -> Self {
        Self {
            id: ColumnId::new_v4(),
            board_id,
            name,
            position,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: ColumnId) -> Self {
        self.id = id;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
