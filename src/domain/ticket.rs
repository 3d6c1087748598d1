use crate::domain::{board::ColumnId, id::entity_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_id!(
    /// Unique identifier for a ticket
    TicketId
);

/// A kanban ticket. `position` is unique and dense among the tickets
/// sharing the same `column_id` once all pending writes have completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Creates a new ticket with the given column, title and position
    pub fn new(column_id: ColumnId, title: String, position: u32) -> Self {
        Self {
            id: TicketId::new_v4(),
            column_id,
            title,
            description: None,
            position,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: TicketId) -> Self {
        self.id = id;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Sets the description. Blank descriptions are stored as `None`.
    pub fn set_description(&mut self, description: String) {
        let trimmed = description.trim();
        self.description = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }
}
