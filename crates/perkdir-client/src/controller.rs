//! One-shot load of the public perk collection with an observable lifecycle.
//!
//! ```text
//! Idle ──activate()──▶ Loading ──▶ Ready(snapshot)
//!                              └─▶ Error(reason)
//! ```
//!
//! There is exactly one fetch per controller. `teardown()` (or dropping the
//! controller) aborts a pending fetch and closes the state channel, so a
//! result that lands afterwards is discarded instead of published.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use perkdir_core::PerkRecord;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::source::PerkSource;

/// Immutable result of a successful fetch.
#[derive(Debug, Clone)]
pub struct PerkSnapshot {
    records: Arc<[PerkRecord]>,
    fetched_at: DateTime<Utc>,
}

impl PerkSnapshot {
    #[must_use]
    pub fn new(records: Vec<PerkRecord>) -> Self {
        Self {
            records: records.into(),
            fetched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn records(&self) -> &[PerkRecord] {
        &self.records
    }

    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum FetchState {
    Idle,
    Loading,
    Error(String),
    Ready(PerkSnapshot),
}

impl FetchState {
    /// True once the fetch has finished, successfully or not.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Ready(_))
    }
}

/// `None` once the controller is torn down.
type Publisher = Arc<Mutex<Option<watch::Sender<FetchState>>>>;

pub struct FetchController<S> {
    source: Arc<S>,
    publisher: Publisher,
    receiver: watch::Receiver<FetchState>,
    task: Option<JoinHandle<()>>,
}

impl<S: PerkSource> FetchController<S> {
    pub fn new(source: S) -> Self {
        let (sender, receiver) = watch::channel(FetchState::Idle);
        Self {
            source: Arc::new(source),
            publisher: Arc::new(Mutex::new(Some(sender))),
            receiver,
            task: None,
        }
    }

    /// Starts the fetch. Only the first call on a live controller does
    /// anything; returns whether this call started it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn activate(&mut self) -> bool {
        if self.task.is_some() || !publish(&self.publisher, FetchState::Loading) {
            return false;
        }

        let source = Arc::clone(&self.source);
        let publisher = Arc::clone(&self.publisher);
        self.task = Some(tokio::spawn(async move {
            let next = match source.fetch_public_perks().await {
                Ok(records) => {
                    tracing::info!(count = records.len(), "perk collection loaded");
                    FetchState::Ready(PerkSnapshot::new(records))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "perk collection fetch failed");
                    FetchState::Error(e.to_string())
                }
            };
            if !publish(&publisher, next) {
                tracing::debug!("controller torn down before fetch resolved; result discarded");
            }
        }));
        true
    }
}

impl<S> FetchController<S> {
    /// Current state.
    #[must_use]
    pub fn state(&self) -> FetchState {
        self.receiver.borrow().clone()
    }

    /// A receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.receiver.clone()
    }

    /// Waits until the fetch has settled and returns that state.
    ///
    /// Returns the current state immediately if the controller is torn down.
    /// Never resolves on a controller that was not activated.
    pub async fn settled(&self) -> FetchState {
        let mut receiver = self.receiver.clone();
        // A closed channel still holds its last value, which is what we want.
        let _ = receiver.wait_for(FetchState::is_settled).await;
        let state = receiver.borrow().clone();
        state
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        lock(&self.publisher).is_none()
    }

    /// Stops the controller. A pending fetch is aborted and its result, if it
    /// still arrives, is never published.
    pub fn teardown(&mut self) {
        let closed = lock(&self.publisher).take().is_some();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if closed {
            tracing::debug!("fetch controller torn down");
        }
    }
}

impl<S> Drop for FetchController<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn lock(publisher: &Publisher) -> std::sync::MutexGuard<'_, Option<watch::Sender<FetchState>>> {
    publisher.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Publishes `state` unless the controller has been torn down.
fn publish(publisher: &Publisher, state: FetchState) -> bool {
    match lock(publisher).as_ref() {
        Some(sender) => {
            sender.send_replace(state);
            true
        }
        None => false,
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
