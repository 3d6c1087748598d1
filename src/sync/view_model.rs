//! What the board view should show at any instant.
//!
//! The view model owns the last authoritative snapshot and the write-set of
//! the reorder currently being applied, guarded together by one mutex. While
//! a reorder is pending its write-set is replayed over whatever snapshot is
//! current, so a poll that lands mid-flight cannot snap the moved item back.
//!
//! Every settlement bumps a generation counter. A fetch remembers the
//! generation it was requested at; if a settlement happened while it was in
//! flight, its snapshot predates the settled writes and is dropped.

use crate::domain::{BoardId, BoardSnapshot, BoardView, WriteSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// How an incoming snapshot was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Stored and rendered as-is
    Applied,
    /// Stored, but a pending reorder still decides the rendered order
    Deferred,
    /// Belonged to a different board and was discarded
    Ignored,
    /// Requested before the latest settlement and discarded
    Stale,
}

#[derive(Debug, Default)]
struct ViewState {
    authoritative: Option<BoardSnapshot>,
    pending: Option<WriteSet>,
    generation: u64,
}

/// Local view of one board. Constructed once per open board view.
#[derive(Debug)]
pub struct OptimisticViewModel {
    board_id: BoardId,
    state: Mutex<ViewState>,
}

impl OptimisticViewModel {
    pub fn new(board_id: BoardId) -> Self {
        Self {
            board_id,
            state: Mutex::new(ViewState::default()),
        }
    }

    /// A view model that starts from an already loaded snapshot
    pub fn with_snapshot(snapshot: BoardSnapshot) -> Self {
        Self {
            board_id: snapshot.board.id.clone(),
            state: Mutex::new(ViewState {
                authoritative: Some(snapshot),
                ..ViewState::default()
            }),
        }
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `write_set` as in flight. Rendering switches to the locally
    /// recomputed order immediately.
    pub fn begin(&self, write_set: WriteSet) {
        let mut state = self.lock();
        if state.pending.is_some() {
            warn!(board = %self.board_id, "Replacing a pending write-set that never settled");
        }
        state.pending = Some(write_set);
    }

    /// Number of settlements so far. Read it before requesting a snapshot
    /// and hand it to [`OptimisticViewModel::apply_fetched`].
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Accepts a snapshot known to be current. It always replaces the
    /// authoritative one; while a reorder is pending the optimistic order
    /// keeps precedence.
    pub fn apply_refresh(&self, snapshot: BoardSnapshot) -> RefreshOutcome {
        self.accept(snapshot, None)
    }

    /// Accepts a snapshot that was requested at `generation`. It is dropped
    /// when a settlement happened after the request went out.
    pub fn apply_fetched(&self, snapshot: BoardSnapshot, generation: u64) -> RefreshOutcome {
        self.accept(snapshot, Some(generation))
    }

    fn accept(&self, snapshot: BoardSnapshot, requested_at: Option<u64>) -> RefreshOutcome {
        if snapshot.board.id != self.board_id {
            warn!(
                board = %self.board_id,
                received = %snapshot.board.id,
                "Ignoring snapshot for a different board"
            );
            return RefreshOutcome::Ignored;
        }

        let mut state = self.lock();
        if let Some(requested_at) = requested_at {
            if requested_at < state.generation {
                debug!(
                    board = %self.board_id,
                    requested_at,
                    generation = state.generation,
                    "Dropping snapshot requested before the last settlement"
                );
                return RefreshOutcome::Stale;
            }
        }
        state.authoritative = Some(snapshot);
        if state.pending.is_some() {
            debug!(board = %self.board_id, "Refresh arrived during a pending reorder");
            RefreshOutcome::Deferred
        } else {
            RefreshOutcome::Applied
        }
    }

    /// Ends the pending reorder. `snapshot` is the trailing refresh, if it
    /// could be read; from here on the server's state is rendered as-is.
    pub fn settle(&self, snapshot: Option<BoardSnapshot>) {
        let mut state = self.lock();
        state.pending = None;
        state.generation += 1;
        match snapshot {
            Some(snapshot) if snapshot.board.id == self.board_id => {
                state.authoritative = Some(snapshot);
            }
            Some(snapshot) => {
                warn!(
                    board = %self.board_id,
                    received = %snapshot.board.id,
                    "Ignoring settlement snapshot for a different board"
                );
            }
            None => {}
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// The last snapshot received from the server
    pub fn authoritative(&self) -> Option<BoardSnapshot> {
        self.lock().authoritative.clone()
    }

    /// The authoritative snapshot with any pending write-set applied
    pub fn effective_snapshot(&self) -> Option<BoardSnapshot> {
        let state = self.lock();
        let mut snapshot = state.authoritative.clone()?;
        if let Some(pending) = &state.pending {
            pending.apply_to(&mut snapshot);
        }
        Some(snapshot)
    }

    /// What the presentation layer should paint right now
    pub fn render(&self) -> Option<BoardView> {
        self.effective_snapshot().map(|snapshot| snapshot.to_view())
    }
}
