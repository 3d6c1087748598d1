//! Applying planned writes against the data API.
//!
//! Every mutating flow follows the same discipline: take the gesture gate,
//! issue calls one at a time, stop at the first failure, then refresh the
//! board exactly once. The gate is a FIFO mutex, so a gesture submitted
//! while another is settling waits its turn instead of being dropped.

use crate::{
    domain::{
        position::slot,
        BoardId, BoardSnapshot, BoardView, Column, ColumnId, ColumnUpdate, EntityUpdate, Gesture,
        ReorderPlanner, Ticket, TicketId, TicketUpdate, WriteSet,
    },
    error::{KanboardError, Result},
    storage::{NewColumn, NewTicket, Storage},
    sync::{
        call::{CallOutput, PersistenceCall},
        poller::Poller,
        view_model::{OptimisticViewModel, RefreshOutcome},
    },
};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of a flow whose calls all succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Number of persistence calls issued
    pub issued: usize,
    /// Whether the trailing refresh was attempted and succeeded
    pub refreshed: bool,
}

impl Settlement {
    fn noop() -> Self {
        Self {
            issued: 0,
            refreshed: false,
        }
    }
}

/// Drives persistence for one open board view
pub struct ReconciliationClient<S: Storage> {
    storage: Arc<S>,
    view: Arc<OptimisticViewModel>,
    gate: Mutex<()>,
}

impl<S: Storage> ReconciliationClient<S> {
    pub fn new(storage: Arc<S>, board_id: BoardId) -> Self {
        Self::with_view_model(storage, Arc::new(OptimisticViewModel::new(board_id)))
    }

    pub fn with_view_model(storage: Arc<S>, view: Arc<OptimisticViewModel>) -> Self {
        Self {
            storage,
            view,
            gate: Mutex::new(()),
        }
    }

    pub fn board_id(&self) -> &BoardId {
        self.view.board_id()
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn view_model(&self) -> &Arc<OptimisticViewModel> {
        &self.view
    }

    /// Reads the board for the first time and returns what to render
    pub async fn load(&self) -> Result<BoardView> {
        self.poll_once().await?;
        self.view.render().ok_or(KanboardError::BoardNotLoaded)
    }

    /// One poll cycle: fetch the board and hand it to the view model.
    ///
    /// A fetch overtaken by a settlement is discarded as
    /// [`RefreshOutcome::Stale`].
    pub async fn poll_once(&self) -> Result<RefreshOutcome> {
        let generation = self.view.generation();
        let snapshot = self.storage.get_board_data(self.board_id()).await?;
        Ok(self.view.apply_fetched(snapshot, generation))
    }

    /// Starts polling the board every `interval`. Polling stops when the
    /// returned handle is dropped.
    pub fn spawn_poller(self: &Arc<Self>, interval: Duration) -> Poller
    where
        S: 'static,
    {
        Poller::spawn(Arc::clone(self), interval)
    }

    /// Plans and applies one reorder gesture.
    ///
    /// The move is rendered optimistically until the writes settle. A no-op
    /// gesture issues nothing and does not refresh.
    pub async fn submit(&self, gesture: &Gesture) -> Result<Settlement> {
        let _turn = self.gate.lock().await;

        let snapshot = self.current_snapshot()?;
        let write_set = ReorderPlanner::plan(&snapshot, gesture)?;
        if write_set.is_empty() {
            debug!(entity = gesture.entity_id(), "Gesture does not change the order");
            return Ok(Settlement::noop());
        }

        info!(
            board = %self.board_id(),
            entity = gesture.entity_id(),
            writes = write_set.len(),
            "Applying reorder"
        );
        self.apply_optimistic(write_set).await
    }

    /// Applies an already planned write-set with optimistic rendering
    pub async fn apply(&self, write_set: WriteSet) -> Result<Settlement> {
        let _turn = self.gate.lock().await;
        if write_set.is_empty() {
            return Ok(Settlement::noop());
        }
        self.apply_optimistic(write_set).await
    }

    /// Appends a column to the end of the board
    pub async fn create_column(&self, name: &str) -> Result<Column> {
        let _turn = self.gate.lock().await;
        let snapshot = self.current_snapshot()?;
        let call = PersistenceCall::CreateColumn(NewColumn {
            board_id: self.board_id().clone(),
            name: name.trim().to_string(),
            position: slot(snapshot.ordered_columns().len())?,
        });

        match self.run_and_refresh(vec![call]).await? {
            (_, Some(CallOutput::Column(column))) => Ok(column),
            _ => Err(KanboardError::StorageError(
                "create_column returned no column".to_string(),
            )),
        }
    }

    /// Appends a ticket to the end of `column_id`
    pub async fn create_ticket(
        &self,
        column_id: &ColumnId,
        title: &str,
        description: Option<&str>,
    ) -> Result<Ticket> {
        let _turn = self.gate.lock().await;
        let snapshot = self.current_snapshot()?;
        if snapshot.column(column_id).is_none() {
            return Err(KanboardError::ColumnNotFound(column_id.to_string()));
        }
        let call = PersistenceCall::CreateTicket(NewTicket {
            column_id: column_id.clone(),
            title: title.trim().to_string(),
            description: description.map(str::to_string),
            position: slot(snapshot.ordered_tickets(column_id).len())?,
        });

        match self.run_and_refresh(vec![call]).await? {
            (_, Some(CallOutput::Ticket(ticket))) => Ok(ticket),
            _ => Err(KanboardError::StorageError(
                "create_ticket returned no ticket".to_string(),
            )),
        }
    }

    pub async fn rename_column(&self, id: &ColumnId, name: &str) -> Result<Settlement> {
        let _turn = self.gate.lock().await;
        let call = PersistenceCall::Update(EntityUpdate::Column(ColumnUpdate::rename(
            id.clone(),
            name.trim().to_string(),
        )));
        Ok(self.run_and_refresh(vec![call]).await?.0)
    }

    /// Changes a ticket's title and/or description. Placement is untouched.
    pub async fn edit_ticket(
        &self,
        id: &TicketId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Settlement> {
        let _turn = self.gate.lock().await;
        let call = PersistenceCall::Update(EntityUpdate::Ticket(TicketUpdate {
            id: id.clone(),
            title: title.map(|t| t.trim().to_string()),
            description: description.map(str::to_string),
            column_id: None,
            position: None,
        }));
        Ok(self.run_and_refresh(vec![call]).await?.0)
    }

    pub async fn rename_board(&self, name: &str) -> Result<Settlement> {
        let _turn = self.gate.lock().await;
        let call = PersistenceCall::RenameBoard {
            id: self.board_id().clone(),
            name: name.trim().to_string(),
        };
        Ok(self.run_and_refresh(vec![call]).await?.0)
    }

    /// Deletes a ticket, then closes the gap it leaves in its column
    pub async fn delete_ticket(&self, id: &TicketId) -> Result<Settlement> {
        let _turn = self.gate.lock().await;
        let snapshot = self.current_snapshot()?;
        let renumber = ReorderPlanner::plan_ticket_removal(&snapshot, id)?;

        let mut calls = vec![PersistenceCall::DeleteTicket(id.clone())];
        calls.extend(Vec::<PersistenceCall>::from(renumber));
        Ok(self.run_and_refresh(calls).await?.0)
    }

    /// Deletes a column with its tickets, then closes the gap it leaves
    pub async fn delete_column(&self, id: &ColumnId) -> Result<Settlement> {
        let _turn = self.gate.lock().await;
        let snapshot = self.current_snapshot()?;
        let renumber = ReorderPlanner::plan_column_removal(&snapshot, id)?;

        let mut calls = vec![PersistenceCall::DeleteColumn(id.clone())];
        calls.extend(Vec::<PersistenceCall>::from(renumber));
        Ok(self.run_and_refresh(calls).await?.0)
    }

    fn current_snapshot(&self) -> Result<BoardSnapshot> {
        self.view
            .effective_snapshot()
            .ok_or(KanboardError::BoardNotLoaded)
    }

    async fn apply_optimistic(&self, write_set: WriteSet) -> Result<Settlement> {
        self.view.begin(write_set.clone());

        let outcome = self.run_calls(&Vec::<PersistenceCall>::from(write_set)).await;
        let snapshot = self.fetch_for_settlement().await;
        let refreshed = snapshot.is_some();
        self.view.settle(snapshot);

        let (issued, _) = outcome?;
        info!(board = %self.board_id(), issued, "Reorder settled");
        Ok(Settlement { issued, refreshed })
    }

    async fn run_and_refresh(
        &self,
        calls: Vec<PersistenceCall>,
    ) -> Result<(Settlement, Option<CallOutput>)> {
        let outcome = self.run_calls(&calls).await;
        let snapshot = self.fetch_for_settlement().await;
        let refreshed = snapshot.is_some();
        self.view.settle(snapshot);

        let (issued, first_output) = outcome?;
        Ok((Settlement { issued, refreshed }, first_output))
    }

    /// Issues `calls` strictly in order, each awaited before the next.
    /// Stops at the first failure; calls already applied stay applied.
    /// Returns the number of calls issued and the first call's output.
    async fn run_calls(&self, calls: &[PersistenceCall]) -> Result<(usize, Option<CallOutput>)> {
        let total = calls.len();
        let mut first_output = None;

        for (index, call) in calls.iter().enumerate() {
            let step = index + 1;
            debug!(entity = %call.entity(), step, total, "Issuing persistence call");

            match call.issue(self.storage.as_ref()).await {
                Ok(output) => {
                    if first_output.is_none() {
                        first_output = Some(output);
                    }
                }
                Err(err) => {
                    warn!(
                        board = %self.board_id(),
                        entity = %call.entity(),
                        step,
                        total,
                        error = %err,
                        "Persistence call failed, abandoning remaining calls"
                    );
                    return Err(KanboardError::PersistenceCallFailed {
                        entity: call.entity(),
                        step,
                        total,
                        source: Box::new(err),
                    });
                }
            }
        }

        Ok((total, first_output))
    }

    /// The trailing refresh. A failed read is logged, not returned: the
    /// poller will pick the board up on its next cycle.
    async fn fetch_for_settlement(&self) -> Option<BoardSnapshot> {
        match self.storage.get_board_data(self.board_id()).await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(board = %self.board_id(), error = %err, "Refresh after settlement failed");
                None
            }
        }
    }
}
