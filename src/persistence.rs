//! Persistence — background writer for debounced card positions.
//!
//! DESIGN
//! ======
//! The canvas engine emits `PersistPositions` batches; the session hands
//! each batch to a bounded queue and returns immediately, so a slow store
//! never blocks interaction. One worker task drains the queue in order and
//! applies each batch through the store's single-write (one update) or
//! batch-write (several) operation. With a single worker, writes for one
//! card land in the order they were emitted and at most one write is in
//! flight at a time.
//!
//! ERROR HANDLING
//! ==============
//! A failed batch is logged and reported as a [`Notice::PersistFailed`] on
//! the notice channel. The optimistic local position is kept; the next move
//! of the card schedules a fresh write. Transient store errors are retried
//! with linear back-off when `retries > 0`.

use std::sync::Arc;
use std::time::Duration;

use canvas::doc::{IdeaId, PositionUpdate};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_PERSIST_QUEUE_CAPACITY, DEFAULT_PERSIST_RETRIES, DEFAULT_PERSIST_RETRY_BASE_MS};
use crate::store::{IdeaStore, StoreError};

// =============================================================================
// TYPES
// =============================================================================

/// Tuning knobs for the position writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistConfig {
    /// Bounded channel capacity for queued batches.
    pub queue_capacity: usize,
    /// Extra attempts after a transient failure. Zero means fail fast.
    pub retries: usize,
    /// Base delay in milliseconds for linear retry back-off.
    pub retry_base_ms: u64,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_PERSIST_QUEUE_CAPACITY,
            retries: DEFAULT_PERSIST_RETRIES,
            retry_base_ms: DEFAULT_PERSIST_RETRY_BASE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    #[error("persist queue full; batch of {0} dropped")]
    QueueFull(usize),
    #[error("persist queue closed; batch of {0} dropped")]
    QueueClosed(usize),
}

/// Transient, user-facing outcome of background persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// These cards' positions could not be saved.
    PersistFailed { ids: Vec<IdeaId>, message: String },
}

/// Sending half of the position queue.
#[derive(Clone)]
pub struct PositionWriter {
    tx: mpsc::Sender<Vec<PositionUpdate>>,
}

impl PositionWriter {
    /// Best-effort, non-blocking enqueue of one batch.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::QueueFull`] or [`PersistError::QueueClosed`];
    /// the batch is dropped in either case.
    pub fn enqueue(&self, updates: Vec<PositionUpdate>) -> Result<(), PersistError> {
        if updates.is_empty() {
            return Ok(());
        }
        let count = updates.len();
        match self.tx.try_send(updates) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(count, "position persist queue full; dropping batch");
                Err(PersistError::QueueFull(count))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(count, "position persist queue closed; dropping batch");
                Err(PersistError::QueueClosed(count))
            }
        }
    }
}

// =============================================================================
// WORKER
// =============================================================================

/// Spawn the position writer. The worker exits once every [`PositionWriter`]
/// clone is dropped and the queue is drained.
#[must_use]
pub fn spawn_position_writer(
    store: Arc<dyn IdeaStore>,
    config: PersistConfig,
    notices: mpsc::UnboundedSender<Notice>,
) -> (PositionWriter, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Vec<PositionUpdate>>(config.queue_capacity.max(1));

    info!(
        queue_capacity = config.queue_capacity,
        retries = config.retries,
        retry_base_ms = config.retry_base_ms,
        "position writer configured"
    );

    let handle = tokio::spawn(async move {
        while let Some(batch) = rx.recv().await {
            match apply_with_retry(store.as_ref(), &batch, config).await {
                Ok(()) => debug!(count = batch.len(), "positions persisted"),
                Err(e) => {
                    warn!(error = %e, count = batch.len(), "position persist failed");
                    let notice = Notice::PersistFailed {
                        ids: batch.iter().map(|u| u.id).collect(),
                        message: e.to_string(),
                    };
                    if notices.send(notice).is_err() {
                        debug!("notice receiver gone; failure reported in logs only");
                    }
                }
            }
        }
        info!("position writer stopped");
    });

    (PositionWriter { tx }, handle)
}

/// Apply one batch, retrying transient failures.
async fn apply_with_retry(store: &dyn IdeaStore, batch: &[PositionUpdate], config: PersistConfig) -> Result<(), StoreError> {
    let mut attempt = 0;
    loop {
        match apply_batch(store, batch).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_transient() && attempt < config.retries => {
                attempt += 1;
                warn!(error = %e, attempt, total = config.retries, count = batch.len(), "position persist failed; retrying");
                tokio::time::sleep(Duration::from_millis((attempt as u64) * config.retry_base_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// One update uses the single-write path; anything larger goes as a batch.
async fn apply_batch(store: &dyn IdeaStore, batch: &[PositionUpdate]) -> Result<(), StoreError> {
    match batch {
        [] => Ok(()),
        [one] => store.update_idea_position(one.id, one.x, one.y).await.map(|_| ()),
        many => store.update_idea_positions(many).await,
    }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
