//! # Kanboard Core
//!
//! Ordered-list reconciliation for drag-and-drop kanban boards.
//!
//! Boards hold columns and columns hold tickets; both levels keep a dense,
//! user-visible `position`. This crate turns a drag gesture into the minimal
//! set of position writes, applies them one at a time against a data API,
//! and keeps an optimistic local view consistent with a periodically
//! polled server snapshot. Rendering and transport are left to the host.

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;
pub mod sync;

// Re-export commonly used types
pub use config::SyncConfig;
pub use domain::{
    board::{Board, BoardId, Column, ColumnId},
    position::{Member, PositionList},
    reorder::{DropResult, Gesture, Location, ReorderPlanner},
    snapshot::{BoardSnapshot, BoardView, ColumnView},
    ticket::{Ticket, TicketId},
    write_set::{EntityUpdate, WriteSet},
};
pub use error::{KanboardError, Result};
pub use storage::{InMemoryStorage, Storage};
pub use sync::{OptimisticViewModel, ReconciliationClient, Settlement};
