//! Session — one board open on the canvas.
//!
//! DESIGN
//! ======
//! `BoardSession` owns the `EngineCore` and is the host for its actions:
//! position batches go to the background writer, delete requests are
//! confirmed against the store and applied back to the engine, everything
//! else is handed to the caller. CRUD goes to the store first and reaches
//! the engine only once the store accepted it, the same way a broadcast
//! from the data layer would.
//!
//! ERROR HANDLING
//! ==============
//! A dropped position batch (full or closed queue) is logged and surfaced
//! as a `PersistFailed` notice; the engine keeps the local position.

use std::sync::Arc;

use canvas::doc::{Group, GroupId, Idea, IdeaId, PartialIdea, PositionUpdate};
use canvas::engine::{Action, EngineCore};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::persistence::{self, Notice, PositionWriter};
use crate::store::{IdeaStore, MemoryStore, StoreError};
use crate::todo::{self, TodoColumn};

pub struct BoardSession {
    engine: EngineCore,
    store: Arc<MemoryStore>,
    writer: PositionWriter,
    worker: JoinHandle<()>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl BoardSession {
    /// Open a session over `store` and spawn its position writer. Must be
    /// called inside a tokio runtime. Failures arrive on the returned receiver.
    #[must_use]
    pub fn start(store: Arc<MemoryStore>, config: &AppConfig) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let backing: Arc<dyn IdeaStore> = store.clone();
        let (writer, worker) = persistence::spawn_position_writer(backing, config.persist, notice_tx.clone());
        let session = Self { engine: EngineCore::with_config(config.engine), store, writer, worker, notices: notice_tx };
        (session, notice_rx)
    }

    /// Load (or reload) the board from the store.
    ///
    /// # Errors
    ///
    /// Returns the store error if the board can't be fetched.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        let snapshot = self.store.fetch_board().await?;
        info!(ideas = snapshot.ideas.len(), groups = snapshot.groups.len(), "board loaded");
        self.engine.load_snapshot(snapshot);
        Ok(())
    }

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    /// Direct access for feeding input events. Pass whatever the engine
    /// returns to [`Self::route`].
    pub fn engine_mut(&mut self) -> &mut EngineCore {
        &mut self.engine
    }

    /// Carry out engine actions and return them unchanged for the caller.
    pub async fn route(&mut self, actions: Vec<Action>) -> Vec<Action> {
        for action in &actions {
            match action {
                Action::PersistPositions { updates } => self.persist(updates.clone()),
                Action::DeleteRequested { ids } => self.delete_ideas(ids).await,
                _ => {}
            }
        }
        actions
    }

    fn persist(&self, updates: Vec<PositionUpdate>) {
        let ids: Vec<IdeaId> = updates.iter().map(|u| u.id).collect();
        if let Err(e) = self.writer.enqueue(updates) {
            let notice = Notice::PersistFailed { ids, message: e.to_string() };
            if self.notices.send(notice).is_err() {
                warn!("notice receiver gone");
            }
        }
    }

    async fn delete_ideas(&mut self, ids: &[IdeaId]) {
        for id in ids {
            match self.store.delete_idea(*id).await {
                Ok(_) | Err(StoreError::IdeaNotFound(_)) => self.engine.apply_delete(id),
                Err(e) => warn!(error = %e, %id, "idea delete failed"),
            }
        }
    }

    // --- Timers ---

    /// Drive the debounce clock.
    pub async fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        let actions = self.engine.tick(now_ms);
        self.route(actions).await
    }

    /// Send every pending write now.
    pub async fn flush(&mut self) -> Vec<Action> {
        let actions = self.engine.flush_pending();
        self.route(actions).await
    }

    /// Arrange the board by group and persist the result.
    pub async fn organize(&mut self, now_ms: f64) -> Vec<Action> {
        let actions = self.engine.organize(now_ms);
        self.route(actions).await
    }

    // --- CRUD ---

    /// # Errors
    ///
    /// Returns the store error; the engine is left untouched.
    pub async fn create_idea(&mut self, idea: Idea) -> Result<Idea, StoreError> {
        let created = self.store.create_idea(idea).await?;
        self.engine.apply_create(created.clone());
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns the store error; the engine is left untouched.
    pub async fn update_idea(&mut self, id: IdeaId, fields: &PartialIdea) -> Result<Idea, StoreError> {
        let updated = self.store.update_idea(id, fields).await?;
        self.engine.apply_update(&id, fields);
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns the store error; the engine is left untouched.
    pub async fn delete_idea(&mut self, id: IdeaId) -> Result<(), StoreError> {
        self.store.delete_idea(id).await?;
        self.engine.apply_delete(&id);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the store error; the engine is left untouched.
    pub async fn create_group(&mut self, group: Group) -> Result<Group, StoreError> {
        let created = self.store.create_group(group).await?;
        self.engine.doc.insert_group(created.clone());
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns the store error; the engine is left untouched.
    pub async fn delete_group(&mut self, id: GroupId) -> Result<Vec<IdeaId>, StoreError> {
        let unassigned = self.store.delete_group(id).await?;
        self.engine.apply_group_delete(&id);
        Ok(unassigned)
    }

    // --- Views ---

    /// The todo-list view of the board as the canvas currently shows it.
    #[must_use]
    pub fn todo_view(&self) -> Vec<TodoColumn> {
        todo::todo_columns(&self.engine.doc.snapshot())
    }

    /// Flush pending writes, close the queue, and wait for the writer to
    /// finish everything already queued.
    pub async fn shutdown(mut self) {
        self.flush().await;
        let Self { writer, worker, .. } = self;
        drop(writer);
        if let Err(e) = worker.await {
            warn!(error = %e, "position writer ended abnormally");
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
