//! Todo view — the board as a grid of group columns.
//!
//! Columns use the same order as the canvas organize layout: groups by name,
//! then an "Ungrouped" column when any idea has no (known) group. Empty
//! groups still get a column; an empty ungrouped column is omitted.

use canvas::doc::{BoardSnapshot, DocStore, GroupId, Idea};
use canvas::layout::{column_keys, column_of, task_order};
use serde::Serialize;

pub const UNGROUPED_TITLE: &str = "Ungrouped";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoColumn {
    /// `None` for the ungrouped column.
    pub group_id: Option<GroupId>,
    pub title: String,
    pub color: Option<String>,
    /// Open ideas first, then by priority (highest first), then title.
    pub items: Vec<Idea>,
    pub completed: usize,
    pub total: usize,
}

/// Build the todo columns for a board snapshot.
#[must_use]
pub fn todo_columns(snapshot: &BoardSnapshot) -> Vec<TodoColumn> {
    let mut doc = DocStore::new();
    doc.load_snapshot(snapshot.clone());

    let mut columns = Vec::new();
    for key in column_keys(&doc) {
        let mut items: Vec<Idea> = doc
            .ideas_in_draw_order()
            .into_iter()
            .filter(|idea| column_of(&doc, idea) == key)
            .cloned()
            .collect();
        items.sort_by(task_order);

        let (title, color) = match key.and_then(|gid| doc.group(&gid)) {
            Some(group) => (group.name.clone(), Some(group.color.clone())),
            None if items.is_empty() => continue,
            None => (UNGROUPED_TITLE.to_string(), None),
        };

        let completed = items.iter().filter(|idea| idea.completed).count();
        columns.push(TodoColumn { group_id: key, title, color, total: items.len(), completed, items });
    }
    columns
}

#[cfg(test)]
#[path = "todo_test.rs"]
mod tests;
