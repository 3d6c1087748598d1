pub mod board;
pub(crate) mod id;
pub mod position;
pub mod reorder;
pub mod snapshot;
pub mod sorting;
pub mod ticket;
pub mod write_set;

pub use board::{Board, BoardId, Column, ColumnId};
pub use position::{Member, PositionList};
pub use reorder::{
    plan_move, plan_removal, DragKind, DropResult, Gesture, Location, Move, PlannedWrite,
    ReorderPlan, ReorderPlanner,
};
pub use snapshot::{BoardSnapshot, BoardView, ColumnView};
pub use sorting::{compare_placement, sort_by_placement, Placed};
pub use ticket::{Ticket, TicketId};
pub use write_set::{ColumnUpdate, EntityUpdate, TicketUpdate, WriteSet};
