//! Input model: modifier keys, buttons, wheel deltas, and the gesture state machine.
//!
//! This module defines the types consumed by the input engine. `Modifiers` and
//! `Button` capture the user's intent at the time of a pointer event.
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up, carrying all context needed to compute positions from the
//! gesture start and emit final writes on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::camera::Point;
use crate::doc::IdeaId;
use crate::hit::Rect;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Whether a selection modifier (shift, ctrl or meta) is held.
    ///
    /// On empty canvas this starts a marquee; on a card it toggles membership.
    #[must_use]
    pub fn selecting(self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Whether the platform command modifier (ctrl or meta) is held.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button (or single-finger touch).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Persistent UI state visible to the host.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Ids of the currently selected cards.
    pub selected: BTreeSet<IdeaId>,
    /// Screen-space marquee while a rectangle selection is in progress.
    pub marquee: Option<Rect>,
}

/// Where a dragged card started, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    pub id: IdeaId,
    pub origin: Point,
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute positions
/// and emit final actions on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Pointer is down on a card but hasn't moved past the drag threshold.
    /// Releasing here is a click.
    Pending {
        /// The card under the pointer.
        id: IdeaId,
        /// Screen position of the pointer-down.
        start_screen: Point,
        /// World position of the pointer-down.
        start_world: Point,
        /// Initial positions of every card that would move, primary first.
        origins: Vec<DragOrigin>,
    },
    /// Exactly one card is following the pointer.
    DraggingSingle {
        /// World position of the pointer-down.
        start_world: Point,
        /// The dragged card and its starting position.
        card: DragOrigin,
    },
    /// Several selected cards follow the pointer with their offsets preserved.
    DraggingMulti {
        /// World position of the pointer-down.
        start_world: Point,
        /// Starting positions of all moving cards, primary first.
        origins: Vec<DragOrigin>,
    },
    /// A marquee is being dragged out over empty canvas.
    RectSelecting {
        /// Screen-space anchor corner.
        start_screen: Point,
        /// Screen-space opposite corner, updated on move.
        current_screen: Point,
        /// Add to the existing selection instead of replacing it.
        additive: bool,
    },
    /// The user is panning the canvas.
    Panning {
        /// Screen position of the pointer-down, for click detection.
        start_screen: Point,
        /// Screen position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
        /// Whether the pointer has travelled past the drag threshold.
        moved: bool,
    },
    /// Two fingers are on the canvas.
    Pinching {
        /// Finger separation at the previous touch event, in screen pixels.
        last_distance: f64,
        /// Midpoint between the fingers at the previous touch event.
        last_center: Point,
    },
}

impl InputState {
    /// Short name for logs and host diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending { .. } => "pending",
            Self::DraggingSingle { .. } => "dragging-single",
            Self::DraggingMulti { .. } => "dragging-multi",
            Self::RectSelecting { .. } => "rectangle-selecting",
            Self::Panning { .. } => "panning",
            Self::Pinching { .. } => "pinching",
        }
    }
}
