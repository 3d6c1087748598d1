use crate::{storage::Storage, sync::client::ReconciliationClient};
use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

/// Background task that refetches the board on a fixed interval.
///
/// Aborted when dropped.
#[derive(Debug)]
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// Must be called from within a tokio runtime
    pub fn spawn<S>(client: Arc<ReconciliationClient<S>>, interval: Duration) -> Self
    where
        S: Storage + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately; the board was just loaded
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match client.poll_once().await {
                    Ok(outcome) => debug!(board = %client.board_id(), ?outcome, "Polled board"),
                    Err(err) => warn!(board = %client.board_id(), error = %err, "Poll failed"),
                }
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops polling
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
