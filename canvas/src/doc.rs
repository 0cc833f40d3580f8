//! Document model: ideas, groups, and the in-memory store.
//!
//! This module defines what lives on the board (`Idea`, `Group`, `Priority`),
//! a sparse-update type for incremental edits (`PartialIdea`), the unit of
//! persistence (`PositionUpdate`), the snapshot exchanged with the data layer
//! (`BoardSnapshot`), and the runtime store that owns all live cards
//! (`DocStore`).
//!
//! Data flows into this layer from the data layer (JSON snapshot) and from the
//! input engine (drags, nudges, organize). Hit-testing reads cards via
//! `ideas_in_draw_order`, bottom first.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;

/// Unique identifier for an idea card.
pub type IdeaId = Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// Idea priority. Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// An idea card as stored in the document and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    /// Unique identifier for this idea.
    pub id: IdeaId,
    /// Short title shown on the card.
    pub title: String,
    /// Optional longer body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    /// Owning group, if any.
    #[serde(default, alias = "groupId")]
    pub group_id: Option<GroupId>,
    /// Left edge of the card in world coordinates.
    #[serde(default, alias = "canvasX")]
    pub x: f64,
    /// Top edge of the card in world coordinates.
    #[serde(default, alias = "canvasY")]
    pub y: f64,
}

impl Idea {
    /// A medium-priority, ungrouped, incomplete idea at `(x, y)`.
    #[must_use]
    pub fn new(title: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            priority: Priority::default(),
            completed: false,
            group_id: None,
            x,
            y,
        }
    }

    /// Top-left corner of the card in world space.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A coloured container for ideas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Any CSS color string.
    pub color: String,
}

impl Group {
    #[must_use]
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), color: color.into() }
    }
}

/// Sparse update for an idea. Only present fields are applied.
///
/// The doubly optional fields distinguish "leave alone" (`None`) from
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialIdea {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub group_id: Option<Option<GroupId>>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// A single card position to persist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: IdeaId,
    pub x: f64,
    pub y: f64,
}

/// Everything the engine needs to hydrate a board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default)]
    pub ideas: Vec<Idea>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// In-memory store of ideas and groups.
///
/// Ideas keep insertion order, which doubles as draw order: later ideas are
/// drawn on top and win hit-tests.
pub struct DocStore {
    ideas: HashMap<IdeaId, Idea>,
    order: Vec<IdeaId>,
    groups: HashMap<GroupId, Group>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { ideas: HashMap::new(), order: Vec::new(), groups: HashMap::new() }
    }

    /// Replace all ideas and groups with a full snapshot.
    pub fn load_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.ideas.clear();
        self.order.clear();
        self.groups.clear();
        for group in snapshot.groups {
            self.groups.insert(group.id, group);
        }
        for idea in snapshot.ideas {
            self.insert(idea);
        }
    }

    /// Insert or replace an idea. A replaced idea keeps its draw-order slot.
    pub fn insert(&mut self, idea: Idea) {
        let id = idea.id;
        if self.ideas.insert(id, idea).is_none() {
            self.order.push(id);
        }
    }

    /// Remove an idea by id, returning it if it was present.
    pub fn remove(&mut self, id: &IdeaId) -> Option<Idea> {
        let removed = self.ideas.remove(id)?;
        self.order.retain(|other| other != id);
        Some(removed)
    }

    /// Return a reference to an idea by id.
    #[must_use]
    pub fn get(&self, id: &IdeaId) -> Option<&Idea> {
        self.ideas.get(id)
    }

    /// Current world position of an idea.
    #[must_use]
    pub fn position(&self, id: &IdeaId) -> Option<Point> {
        self.ideas.get(id).map(Idea::position)
    }

    /// Move an idea. Returns false if the idea doesn't exist.
    pub fn set_position(&mut self, id: &IdeaId, pos: Point) -> bool {
        let Some(idea) = self.ideas.get_mut(id) else {
            return false;
        };
        idea.x = pos.x;
        idea.y = pos.y;
        true
    }

    /// Apply a partial update to an existing idea. Returns false if the idea doesn't exist.
    pub fn apply_partial(&mut self, id: &IdeaId, partial: &PartialIdea) -> bool {
        let Some(idea) = self.ideas.get_mut(id) else {
            return false;
        };
        if let Some(ref title) = partial.title {
            idea.title.clone_from(title);
        }
        if let Some(ref description) = partial.description {
            idea.description.clone_from(description);
        }
        if let Some(priority) = partial.priority {
            idea.priority = priority;
        }
        if let Some(completed) = partial.completed {
            idea.completed = completed;
        }
        if let Some(group_id) = partial.group_id {
            idea.group_id = group_id;
        }
        if let Some(x) = partial.x {
            idea.x = x;
        }
        if let Some(y) = partial.y {
            idea.y = y;
        }
        true
    }

    /// Insert or replace a group.
    pub fn insert_group(&mut self, group: Group) {
        self.groups.insert(group.id, group);
    }

    /// Remove a group and unassign its ideas. Returns the ids of the ideas
    /// that were unassigned, in draw order.
    pub fn remove_group(&mut self, id: &GroupId) -> Vec<IdeaId> {
        self.groups.remove(id);
        let mut unassigned = Vec::new();
        for idea_id in &self.order {
            if let Some(idea) = self.ideas.get_mut(idea_id)
                && idea.group_id.as_ref() == Some(id)
            {
                idea.group_id = None;
                unassigned.push(*idea_id);
            }
        }
        unassigned
    }

    /// Return a reference to a group by id.
    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    /// All groups sorted by `(name, id)`.
    #[must_use]
    pub fn sorted_groups(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.values().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        groups
    }

    /// All ideas, bottom-most first.
    #[must_use]
    pub fn ideas_in_draw_order(&self) -> Vec<&Idea> {
        self.order.iter().filter_map(|id| self.ideas.get(id)).collect()
    }

    /// Ids of all ideas, bottom-most first.
    #[must_use]
    pub fn ids(&self) -> &[IdeaId] {
        &self.order
    }

    /// Copy the store back out as a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            ideas: self.ideas_in_draw_order().into_iter().cloned().collect(),
            groups: self.sorted_groups().into_iter().cloned().collect(),
        }
    }

    /// Number of ideas currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    /// Returns `true` if the store contains no ideas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}
