//! Shared numeric constants for the canvas crate.

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.25;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 4.0;

/// Multiplicative zoom step for one wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

// ── Cards ───────────────────────────────────────────────────────

/// Card width in world units.
pub const CARD_WIDTH: f64 = 240.0;

/// Card height in world units.
pub const CARD_HEIGHT: f64 = 120.0;

/// Gap between cards placed by `organize`, in world units.
pub const LAYOUT_GAP: f64 = 32.0;

// ── Gestures ────────────────────────────────────────────────────

/// Screen-space movement a pointer must exceed before a press becomes a drag.
pub const DRAG_THRESHOLD_PX: f64 = 4.0;

/// Arrow-key nudge distance in world units (shift multiplies by ten).
pub const NUDGE_STEP: f64 = 1.0;

// ── Persistence ─────────────────────────────────────────────────

/// Quiet period before a moved card's position is written, in milliseconds.
pub const POSITION_DEBOUNCE_MS: f64 = 200.0;
