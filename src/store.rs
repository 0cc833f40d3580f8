//! Store — the data layer the canvas persists into.
//!
//! DESIGN
//! ======
//! `IdeaStore` is the narrow, object-safe surface the persistence worker
//! needs: read the board, write one position, write a batch of positions.
//! `MemoryStore` implements it over a `DocStore` behind a tokio `RwLock`
//! and adds the CRUD the session uses for ideas and groups.
//!
//! ERROR HANDLING
//! ==============
//! Batch position writes are all-or-nothing: every id is checked before any
//! card moves, so a failed batch leaves the board exactly as it was.
//! `Unavailable` is the only transient error; not-found errors are final.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use canvas::camera::Point;
use canvas::doc::{BoardSnapshot, DocStore, Group, GroupId, Idea, IdeaId, PartialIdea, PositionUpdate};
use tokio::sync::RwLock;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("idea not found: {0}")]
    IdeaNotFound(IdeaId),
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether retrying the same write could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Object-safe data-layer surface consumed by the canvas side.
#[async_trait::async_trait]
pub trait IdeaStore: Send + Sync {
    /// Read every idea and group.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store can't be reached.
    async fn fetch_board(&self) -> Result<BoardSnapshot, StoreError>;

    /// Move one idea and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdeaNotFound`] for an unknown id.
    async fn update_idea_position(&self, id: IdeaId, x: f64, y: f64) -> Result<Idea, StoreError>;

    /// Move several ideas at once. Either every update applies or none do.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdeaNotFound`] naming the first unknown id.
    async fn update_idea_positions(&self, updates: &[PositionUpdate]) -> Result<(), StoreError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process store backed by a [`DocStore`].
#[derive(Default)]
pub struct MemoryStore {
    doc: RwLock<DocStore>,
    /// Position batches in the order they were applied.
    applied: RwLock<Vec<Vec<PositionUpdate>>>,
    unavailable: AtomicBool,
    /// Remaining writes to fail with `Unavailable` before recovering.
    fail_next: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `snapshot`.
    #[must_use]
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        let mut doc = DocStore::new();
        doc.load_snapshot(snapshot);
        Self { doc: RwLock::new(doc), ..Self::default() }
    }

    /// Make every operation fail with `Unavailable` until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail the next `count` position writes with `Unavailable`.
    pub fn fail_next_writes(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Every position batch applied so far, oldest first. Single-idea writes
    /// appear as one-element batches.
    pub async fn applied_writes(&self) -> Vec<Vec<PositionUpdate>> {
        self.applied.read().await.clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store switched off".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        self.check_available()?;
        let injected = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if injected.is_ok() {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }

    fn check_group(doc: &DocStore, group_id: Option<GroupId>) -> Result<(), StoreError> {
        match group_id {
            Some(gid) if doc.group(&gid).is_none() => Err(StoreError::GroupNotFound(gid)),
            _ => Ok(()),
        }
    }

    // --- Ideas ---

    /// # Errors
    ///
    /// Returns [`StoreError::GroupNotFound`] if `idea.group_id` names an unknown group.
    pub async fn create_idea(&self, idea: Idea) -> Result<Idea, StoreError> {
        self.check_available()?;
        let mut doc = self.doc.write().await;
        Self::check_group(&doc, idea.group_id)?;
        doc.insert(idea.clone());
        Ok(idea)
    }

    /// Apply the fields present in `fields` and return the updated idea.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdeaNotFound`] or [`StoreError::GroupNotFound`].
    pub async fn update_idea(&self, id: IdeaId, fields: &PartialIdea) -> Result<Idea, StoreError> {
        self.check_available()?;
        let mut doc = self.doc.write().await;
        if let Some(group_id) = fields.group_id {
            Self::check_group(&doc, group_id)?;
        }
        if !doc.apply_partial(&id, fields) {
            return Err(StoreError::IdeaNotFound(id));
        }
        doc.get(&id).cloned().ok_or(StoreError::IdeaNotFound(id))
    }

    /// # Errors
    ///
    /// Returns [`StoreError::IdeaNotFound`] for an unknown id.
    pub async fn delete_idea(&self, id: IdeaId) -> Result<Idea, StoreError> {
        self.check_available()?;
        self.doc.write().await.remove(&id).ok_or(StoreError::IdeaNotFound(id))
    }

    // --- Groups ---

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store is switched off.
    pub async fn create_group(&self, group: Group) -> Result<Group, StoreError> {
        self.check_available()?;
        self.doc.write().await.insert_group(group.clone());
        Ok(group)
    }

    /// Rename or recolour a group. `None` leaves a field unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GroupNotFound`] for an unknown id.
    pub async fn update_group(&self, id: GroupId, name: Option<String>, color: Option<String>) -> Result<Group, StoreError> {
        self.check_available()?;
        let mut doc = self.doc.write().await;
        let mut group = doc.group(&id).cloned().ok_or(StoreError::GroupNotFound(id))?;
        if let Some(name) = name {
            group.name = name;
        }
        if let Some(color) = color {
            group.color = color;
        }
        doc.insert_group(group.clone());
        Ok(group)
    }

    /// Delete a group. Its ideas are kept and become ungrouped; their ids are
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GroupNotFound`] for an unknown id.
    pub async fn delete_group(&self, id: GroupId) -> Result<Vec<IdeaId>, StoreError> {
        self.check_available()?;
        let mut doc = self.doc.write().await;
        if doc.group(&id).is_none() {
            return Err(StoreError::GroupNotFound(id));
        }
        Ok(doc.remove_group(&id))
    }
}

#[async_trait::async_trait]
impl IdeaStore for MemoryStore {
    async fn fetch_board(&self) -> Result<BoardSnapshot, StoreError> {
        self.check_available()?;
        Ok(self.doc.read().await.snapshot())
    }

    async fn update_idea_position(&self, id: IdeaId, x: f64, y: f64) -> Result<Idea, StoreError> {
        self.check_write()?;
        let mut doc = self.doc.write().await;
        if !doc.set_position(&id, Point::new(x, y)) {
            return Err(StoreError::IdeaNotFound(id));
        }
        let idea = doc.get(&id).cloned().ok_or(StoreError::IdeaNotFound(id))?;
        self.applied.write().await.push(vec![PositionUpdate { id, x, y }]);
        Ok(idea)
    }

    async fn update_idea_positions(&self, updates: &[PositionUpdate]) -> Result<(), StoreError> {
        self.check_write()?;
        let mut doc = self.doc.write().await;
        if let Some(missing) = updates.iter().find(|u| doc.get(&u.id).is_none()) {
            return Err(StoreError::IdeaNotFound(missing.id));
        }
        for update in updates {
            doc.set_position(&update.id, Point::new(update.x, update.y));
        }
        self.applied.write().await.push(updates.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
