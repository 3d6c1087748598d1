use crate::{
    domain::{Board, BoardId, Column, ColumnId, EntityUpdate, Ticket, TicketId, WriteSet},
    error::Result,
    storage::{NewColumn, NewTicket, Storage},
};

/// One request against the data API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceCall {
    Update(EntityUpdate),
    CreateColumn(NewColumn),
    CreateTicket(NewTicket),
    DeleteColumn(ColumnId),
    DeleteTicket(TicketId),
    RenameBoard { id: BoardId, name: String },
}

/// What a successful call returned
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutput {
    Board(Board),
    Column(Column),
    Ticket(Ticket),
    Deleted(bool),
}

impl PersistenceCall {
    /// Identifies the entity the call targets, for logs and errors
    pub fn entity(&self) -> String {
        match self {
            Self::Update(update) => update.entity_id().to_string(),
            Self::CreateColumn(input) => format!("new column in {}", input.board_id),
            Self::CreateTicket(input) => format!("new ticket in {}", input.column_id),
            Self::DeleteColumn(id) => id.to_string(),
            Self::DeleteTicket(id) => id.to_string(),
            Self::RenameBoard { id, .. } => id.to_string(),
        }
    }

    pub async fn issue<S: Storage + ?Sized>(&self, storage: &S) -> Result<CallOutput> {
        match self {
            Self::Update(EntityUpdate::Column(update)) => {
                storage.update_column(update).await.map(CallOutput::Column)
            }
            Self::Update(EntityUpdate::Ticket(update)) => {
                storage.update_ticket(update).await.map(CallOutput::Ticket)
            }
            Self::CreateColumn(input) => storage.create_column(input).await.map(CallOutput::Column),
            Self::CreateTicket(input) => storage.create_ticket(input).await.map(CallOutput::Ticket),
            Self::DeleteColumn(id) => storage.delete_column(id).await.map(CallOutput::Deleted),
            Self::DeleteTicket(id) => storage.delete_ticket(id).await.map(CallOutput::Deleted),
            Self::RenameBoard { id, name } => {
                storage.update_board(id, name).await.map(CallOutput::Board)
            }
        }
    }
}

impl From<WriteSet> for Vec<PersistenceCall> {
    fn from(write_set: WriteSet) -> Self {
        write_set
            .updates
            .into_iter()
            .map(PersistenceCall::Update)
            .collect()
    }
}
