use crate::domain::{
    board::ColumnId,
    snapshot::BoardSnapshot,
    ticket::TicketId,
};
use serde::{Deserialize, Serialize};

/// Field changes for one column. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnUpdate {
    pub id: ColumnId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl ColumnUpdate {
    pub fn position(id: ColumnId, position: u32) -> Self {
        Self {
            id,
            name: None,
            position: Some(position),
        }
    }

    pub fn rename(id: ColumnId, name: String) -> Self {
        Self {
            id,
            name: Some(name),
            position: None,
        }
    }
}

/// Field changes for one ticket. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketUpdate {
    pub id: TicketId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl TicketUpdate {
    pub fn position(id: TicketId, position: u32) -> Self {
        Self {
            id,
            title: None,
            description: None,
            column_id: None,
            position: Some(position),
        }
    }

    /// A position write that also moves the ticket into `column_id`
    pub fn relocate(id: TicketId, column_id: ColumnId, position: u32) -> Self {
        Self {
            id,
            title: None,
            description: None,
            column_id: Some(column_id),
            position: Some(position),
        }
    }
}

/// A single per-entity update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum EntityUpdate {
    Column(ColumnUpdate),
    Ticket(TicketUpdate),
}

impl EntityUpdate {
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Column(update) => update.id.as_str(),
            Self::Ticket(update) => update.id.as_str(),
        }
    }

    pub fn new_position(&self) -> Option<u32> {
        match self {
            Self::Column(update) => update.position,
            Self::Ticket(update) => update.position,
        }
    }

    /// Applies the update to the matching entity in `snapshot`.
    ///
    /// Returns `false` when the snapshot no longer contains the entity.
    pub fn apply_to(&self, snapshot: &mut BoardSnapshot) -> bool {
        match self {
            Self::Column(update) => {
                let Some(column) = snapshot.columns.iter_mut().find(|c| c.id == update.id) else {
                    return false;
                };
                if let Some(name) = &update.name {
                    column.name = name.clone();
                }
                if let Some(position) = update.position {
                    column.position = position;
                }
                true
            }
            Self::Ticket(update) => {
                let Some(ticket) = snapshot.tickets.iter_mut().find(|t| t.id == update.id) else {
                    return false;
                };
                if let Some(title) = &update.title {
                    ticket.title = title.clone();
                }
                if let Some(description) = &update.description {
                    ticket.set_description(description.clone());
                }
                if let Some(column_id) = &update.column_id {
                    ticket.column_id = column_id.clone();
                }
                if let Some(position) = update.position {
                    ticket.position = position;
                }
                true
            }
        }
    }
}

/// The ordered list of updates that realises one gesture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSet {
    pub updates: Vec<EntityUpdate>,
}

impl WriteSet {
    pub fn new(updates: Vec<EntityUpdate>) -> Self {
        Self { updates }
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityUpdate> {
        self.updates.iter()
    }

    /// Applies every update to `snapshot` in order. Updates whose entity
    /// has disappeared from the snapshot are skipped.
    pub fn apply_to(&self, snapshot: &mut BoardSnapshot) {
        for update in &self.updates {
            if !update.apply_to(snapshot) {
                tracing::debug!(
                    entity = update.entity_id(),
                    "Skipping optimistic update for entity missing from snapshot"
                );
            }
        }
    }
}
