pub mod call;
pub mod client;
pub mod poller;
pub mod view_model;

pub use call::{CallOutput, PersistenceCall};
pub use client::{ReconciliationClient, Settlement};
pub use poller::Poller;
pub use view_model::{OptimisticViewModel, RefreshOutcome};
