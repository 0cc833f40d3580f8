//! Hit-testing: which card is under a point, and which cards a marquee touches.
//!
//! Everything here works in screen space. Card rectangles are derived from the
//! card's world position through the same [`Camera`] the host renders with, so
//! what the user sees is what gets selected.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use serde::Serialize;

use crate::camera::{Camera, Point};
use crate::doc::{DocStore, Idea, IdeaId};

/// Axis-aligned rectangle, normalised so `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Build a rectangle from any two opposite corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Whether `pt` lies inside or on the border.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.min_x && pt.x <= self.max_x && pt.y >= self.min_y && pt.y <= self.max_y
    }

    /// Standard AABB overlap: true when the rectangles share any area or edge.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min_x <= other.max_x && other.min_x <= self.max_x && self.min_y <= other.max_y && other.min_y <= self.max_y
    }
}

/// Fixed card footprint in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSize {
    pub width: f64,
    pub height: f64,
}

/// Screen-space bounding box of a card.
#[must_use]
pub fn card_screen_rect(idea: &Idea, size: CardSize, camera: &Camera) -> Rect {
    let top_left = camera.world_to_screen(idea.position());
    Rect {
        min_x: top_left.x,
        min_y: top_left.y,
        max_x: top_left.x + size.width * camera.zoom,
        max_y: top_left.y + size.height * camera.zoom,
    }
}

/// Top-most card under `screen_pt`, if any.
#[must_use]
pub fn hit_test(screen_pt: Point, doc: &DocStore, size: CardSize, camera: &Camera) -> Option<IdeaId> {
    doc.ideas_in_draw_order()
        .into_iter()
        .rev()
        .find(|idea| card_screen_rect(idea, size, camera).contains(screen_pt))
        .map(|idea| idea.id)
}

/// Every card whose screen rect overlaps `marquee`, in draw order.
///
/// Partially covered cards count.
#[must_use]
pub fn ideas_in_rect(marquee: &Rect, doc: &DocStore, size: CardSize, camera: &Camera) -> Vec<IdeaId> {
    doc.ideas_in_draw_order()
        .into_iter()
        .filter(|idea| card_screen_rect(idea, size, camera).overlaps(marquee))
        .map(|idea| idea.id)
        .collect()
}
