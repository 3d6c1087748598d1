//! Table-level board data shared by the storage backends.

use crate::{
    domain::{
        sort_by_placement, Board, BoardId, BoardSnapshot, Column, ColumnId, ColumnUpdate, Ticket,
        TicketId, TicketUpdate,
    },
    error::{KanboardError, Result},
    storage::{NewColumn, NewTicket},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Boards, columns and tickets keyed by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardTables {
    #[serde(default)]
    boards: BTreeMap<BoardId, Board>,
    #[serde(default)]
    columns: BTreeMap<ColumnId, Column>,
    #[serde(default)]
    tickets: BTreeMap<TicketId, Ticket>,
}

impl BoardTables {
    pub const DEFAULT_BOARD_ID: &'static str = "default-board";

    pub fn new() -> Self {
        Self::default()
    }

    /// Demo content: one board with three columns and a handful of tickets
    pub fn seeded() -> Self {
        let mut tables = Self::new();
        let board =
            Board::new("Task Board".to_string()).with_id(BoardId::from(Self::DEFAULT_BOARD_ID));

        let columns = [("col-1", "To Do"), ("col-2", "In Progress"), ("col-3", "Done")];
        for (position, (id, name)) in columns.iter().enumerate() {
            tables.insert_column(
                Column::new(board.id.clone(), name.to_string(), position as u32)
                    .with_id(ColumnId::from(*id)),
            );
        }

        let tickets = [
            ("ticket-1", "col-1", "Sketch the board layout", "Columns first, tickets later"),
            ("ticket-2", "col-1", "Wire up drag and drop", "Columns and tickets"),
            ("ticket-3", "col-2", "Go for a walk", "Grab some water, too"),
            ("ticket-4", "col-3", "Write test cases", "Cover cross-column moves"),
            ("ticket-5", "col-3", "Fix failing tests", "Start with the flaky ones"),
            ("ticket-6", "col-3", "Test end to end", "Different browsers"),
            ("ticket-7", "col-3", "Document work", "Include next steps"),
        ];
        let mut next_position: BTreeMap<&str, u32> = BTreeMap::new();
        for (id, column, title, description) in tickets {
            let slot = next_position.entry(column).or_insert(0);
            let mut ticket = Ticket::new(ColumnId::from(column), title.to_string(), *slot)
                .with_id(TicketId::from(id));
            ticket.set_description(description.to_string());
            tables.insert_ticket(ticket);
            *slot += 1;
        }

        tables.insert_board(board);
        tables
    }

    /// Builds tables holding exactly the contents of `snapshot`
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        let mut tables = Self::new();
        tables.insert_board(snapshot.board);
        for column in snapshot.columns {
            tables.insert_column(column);
        }
        for ticket in snapshot.tickets {
            tables.insert_ticket(ticket);
        }
        tables
    }

    pub fn insert_board(&mut self, board: Board) {
        self.boards.insert(board.id.clone(), board);
    }

    pub fn insert_column(&mut self, column: Column) {
        self.columns.insert(column.id.clone(), column);
    }

    pub fn insert_ticket(&mut self, ticket: Ticket) {
        self.tickets.insert(ticket.id.clone(), ticket);
    }

    pub fn list_boards(&self) -> Vec<Board> {
        let mut boards: Vec<Board> = self.boards.values().cloned().collect();
        boards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        boards
    }

    pub fn snapshot(&self, board_id: &BoardId) -> Result<BoardSnapshot> {
        let board = self
            .boards
            .get(board_id)
            .cloned()
            .ok_or_else(|| KanboardError::BoardNotFound(board_id.to_string()))?;

        let mut columns: Vec<Column> = self
            .columns
            .values()
            .filter(|c| &c.board_id == board_id)
            .cloned()
            .collect();
        sort_by_placement(&mut columns);

        let mut tickets = Vec::new();
        for column in &columns {
            let mut in_column: Vec<Ticket> = self
                .tickets
                .values()
                .filter(|t| t.column_id == column.id)
                .cloned()
                .collect();
            sort_by_placement(&mut in_column);
            tickets.extend(in_column);
        }

        Ok(BoardSnapshot::new(board, columns, tickets))
    }

    pub fn create_board(&mut self, name: &str) -> Board {
        let board = Board::new(name.to_string());
        self.insert_board(board.clone());
        board
    }

    pub fn update_board(&mut self, id: &BoardId, name: &str) -> Result<Board> {
        let board = self
            .boards
            .get_mut(id)
            .ok_or_else(|| KanboardError::BoardNotFound(id.to_string()))?;
        board.name = name.to_string();
        Ok(board.clone())
    }

    pub fn delete_board(&mut self, id: &BoardId) -> bool {
        let columns: Vec<ColumnId> = self
            .columns
            .values()
            .filter(|c| &c.board_id == id)
            .map(|c| c.id.clone())
            .collect();
        for column in &columns {
            self.delete_column(column);
        }
        self.boards.remove(id).is_some()
    }

    pub fn create_column(&mut self, input: &NewColumn) -> Result<Column> {
        if !self.boards.contains_key(&input.board_id) {
            return Err(KanboardError::BoardNotFound(input.board_id.to_string()));
        }
        let column = Column::new(input.board_id.clone(), input.name.clone(), input.position);
        self.insert_column(column.clone());
        Ok(column)
    }

    pub fn update_column(&mut self, input: &ColumnUpdate) -> Result<Column> {
        let column = self
            .columns
            .get_mut(&input.id)
            .ok_or_else(|| KanboardError::ColumnNotFound(input.id.to_string()))?;
        if let Some(name) = &input.name {
            column.name = name.clone();
        }
        if let Some(position) = input.position {
            column.position = position;
        }
        Ok(column.clone())
    }

    pub fn delete_column(&mut self, id: &ColumnId) -> bool {
        self.tickets.retain(|_, t| &t.column_id != id);
        self.columns.remove(id).is_some()
    }

    pub fn create_ticket(&mut self, input: &NewTicket) -> Result<Ticket> {
        if !self.columns.contains_key(&input.column_id) {
            return Err(KanboardError::ColumnNotFound(input.column_id.to_string()));
        }
        let mut ticket = Ticket::new(input.column_id.clone(), input.title.clone(), input.position);
        if let Some(description) = &input.description {
            ticket.set_description(description.clone());
        }
        self.insert_ticket(ticket.clone());
        Ok(ticket)
    }

    /// Applies a ticket update. Fails without touching the ticket when the
    /// target column does not exist.
    pub fn update_ticket(&mut self, input: &TicketUpdate) -> Result<Ticket> {
        if let Some(column_id) = &input.column_id {
            if !self.columns.contains_key(column_id) {
                return Err(KanboardError::ColumnNotFound(column_id.to_string()));
            }
        }
        let ticket = self
            .tickets
            .get_mut(&input.id)
            .ok_or_else(|| KanboardError::TicketNotFound(input.id.to_string()))?;
        if let Some(title) = &input.title {
            ticket.title = title.clone();
        }
        if let Some(description) = &input.description {
            ticket.set_description(description.clone());
        }
        if let Some(column_id) = &input.column_id {
            ticket.column_id = column_id.clone();
        }
        if let Some(position) = input.position {
            ticket.position = position;
        }
        Ok(ticket.clone())
    }

    pub fn delete_ticket(&mut self, id: &TicketId) -> bool {
        self.tickets.remove(id).is_some()
    }
}
