use crate::domain::{
    board::{Board, Column, ColumnId},
    position::Member,
    sorting::sort_by_placement,
    ticket::{Ticket, TicketId},
};
use serde::{Deserialize, Serialize};

/// Everything the data API returns for one board: the board itself, its
/// columns and every ticket in those columns. Collections are unordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Board,
    pub columns: Vec<Column>,
    pub tickets: Vec<Ticket>,
}

impl BoardSnapshot {
    pub fn new(board: Board, columns: Vec<Column>, tickets: Vec<Ticket>) -> Self {
        Self {
            board,
            columns,
            tickets,
        }
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    pub fn ticket(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| &t.id == id)
    }

    /// The board's columns in display order
    pub fn ordered_columns(&self) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .columns
            .iter()
            .filter(|c| c.board_id == self.board.id)
            .cloned()
            .collect();
        sort_by_placement(&mut columns);
        columns
    }

    /// The tickets of one column in display order
    pub fn ordered_tickets(&self, column_id: &ColumnId) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = self
            .tickets
            .iter()
            .filter(|t| &t.column_id == column_id)
            .cloned()
            .collect();
        sort_by_placement(&mut tickets);
        tickets
    }

    /// Column group members in display order, ready for a `PositionList`
    pub fn column_members(&self) -> Vec<Member<ColumnId>> {
        self.ordered_columns()
            .into_iter()
            .map(|c| Member::new(c.id, c.position))
            .collect()
    }

    /// Ticket group members of one column in display order
    pub fn ticket_members(&self, column_id: &ColumnId) -> Vec<Member<TicketId>> {
        self.ordered_tickets(column_id)
            .into_iter()
            .map(|t| Member::new(t.id, t.position))
            .collect()
    }

    /// Resolves the snapshot into what the presentation layer paints.
    /// Tickets pointing at a column outside this board are not shown.
    pub fn to_view(&self) -> BoardView {
        let columns = self
            .ordered_columns()
            .into_iter()
            .map(|column| {
                let tickets = self.ordered_tickets(&column.id);
                ColumnView { column, tickets }
            })
            .collect();

        BoardView {
            board: self.board.clone(),
            columns,
        }
    }
}

/// A column with its tickets, both in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnView {
    pub column: Column,
    pub tickets: Vec<Ticket>,
}

impl ColumnView {
    pub fn ticket_ids(&self) -> Vec<&str> {
        self.tickets.iter().map(|t| t.id.as_str()).collect()
    }
}

/// A fully ordered board, ready to render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub board: Board,
    pub columns: Vec<ColumnView>,
}

impl BoardView {
    pub fn column_ids(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column.id.as_str()).collect()
    }

    pub fn column(&self, id: &ColumnId) -> Option<&ColumnView> {
        self.columns.iter().find(|c| &c.column.id == id)
    }
}
