//! Organize: lay ideas out in one column per group.
//!
//! Columns follow group name order with ungrouped ideas last. Inside a column
//! open ideas come before completed ones, then higher priority first, then
//! title. The layout starts at the world origin.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use std::cmp::Ordering;

use crate::doc::{DocStore, GroupId, Idea, PositionUpdate};
use crate::hit::CardSize;

/// Ordering used by both the organize layout and list views:
/// incomplete first, then priority descending, then title.
#[must_use]
pub fn task_order(a: &Idea, b: &Idea) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.id.cmp(&b.id))
}

/// Column keys in display order: every known group by name, then `None` for
/// ungrouped ideas. Ideas pointing at a group the store doesn't know about
/// land in the ungrouped column.
#[must_use]
pub fn column_keys(doc: &DocStore) -> Vec<Option<GroupId>> {
    let mut keys: Vec<Option<GroupId>> = doc.sorted_groups().iter().map(|g| Some(g.id)).collect();
    keys.push(None);
    keys
}

/// The column an idea belongs in: its group if the store knows it, else `None`.
#[must_use]
pub fn column_of(doc: &DocStore, idea: &Idea) -> Option<GroupId> {
    idea.group_id.filter(|gid| doc.group(gid).is_some())
}

/// Compute organized positions for every idea. Ideas already in place are
/// left out of the result.
#[must_use]
pub fn organize(doc: &DocStore, size: CardSize, gap: f64) -> Vec<PositionUpdate> {
    let col_pitch = size.width + gap;
    let row_pitch = size.height + gap;
    let mut updates = Vec::new();
    let mut col = 0.0;

    for key in column_keys(doc) {
        let mut members: Vec<&Idea> = doc
            .ideas_in_draw_order()
            .into_iter()
            .filter(|idea| column_of(doc, idea) == key)
            .collect();
        if members.is_empty() {
            continue;
        }
        members.sort_by(|a, b| task_order(a, b));

        let x = col * col_pitch;
        let mut row = 0.0;
        for idea in members {
            let y = row * row_pitch;
            if (idea.x - x).abs() > f64::EPSILON || (idea.y - y).abs() > f64::EPSILON {
                updates.push(PositionUpdate { id: idea.id, x, y });
            }
            row += 1.0;
        }
        col += 1.0;
    }

    updates
}
