//! Browser binding for [`EngineCore`].
//!
//! Every method takes primitives from DOM events and returns the resulting
//! actions as a JSON array string, so the host can `JSON.parse` and dispatch
//! them without any generated type glue. Modifier keys arrive packed into a
//! bitmask (see [`MOD_SHIFT`] and friends).

#[cfg(test)]
#[path = "wasm_test.rs"]
mod wasm_test;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use crate::camera::Point;
use crate::doc::{BoardSnapshot, Idea, IdeaId, PartialIdea};
use crate::engine::{Action, EngineConfig, EngineCore};
use crate::input::{Button, Key, Modifiers, WheelDelta};

pub const MOD_SHIFT: u8 = 1;
pub const MOD_CTRL: u8 = 1 << 1;
pub const MOD_ALT: u8 = 1 << 2;
pub const MOD_META: u8 = 1 << 3;

fn modifiers(bits: u8) -> Modifiers {
    Modifiers {
        shift: bits & MOD_SHIFT != 0,
        ctrl: bits & MOD_CTRL != 0,
        alt: bits & MOD_ALT != 0,
        meta: bits & MOD_META != 0,
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> String {
    // Engine output is plain numbers, strings, and ids; serialization cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| String::from("null"))
}

fn actions(list: &[Action]) -> String {
    encode(list)
}

fn parse_id(raw: &str) -> Result<IdeaId, String> {
    Uuid::parse_str(raw).map_err(|e| format!("invalid id {raw:?}: {e}"))
}

/// Flat `[x0, y0, x1, y1, ...]` touch coordinates into points.
fn touch_points(coords: &[f64]) -> Vec<Point> {
    coords.chunks_exact(2).map(|pair| Point::new(pair[0], pair[1])).collect()
}

fn field<T: serde::de::DeserializeOwned>(map: &serde_json::Map<String, Value>, key: &str) -> Result<Option<T>, String> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| format!("field {key}: {e}")),
    }
}

/// Decode a partial-update broadcast. A key that is present with `null`
/// clears a nullable field; an absent key leaves it unchanged.
fn partial_from_json(json: &str) -> Result<PartialIdea, String> {
    let value: Value = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let Value::Object(map) = value else {
        return Err(String::from("partial update must be a JSON object"));
    };
    Ok(PartialIdea {
        title: field(&map, "title")?,
        description: field(&map, "description")?,
        priority: field(&map, "priority")?,
        completed: field(&map, "completed")?,
        group_id: match field(&map, "groupId")? {
            Some(v) => Some(v),
            None => field(&map, "group_id")?,
        },
        x: match field(&map, "canvasX")? {
            Some(v) => Some(v),
            None => field(&map, "x")?,
        },
        y: match field(&map, "canvasY")? {
            Some(v) => Some(v),
            None => field(&map, "y")?,
        },
    })
}

/// The canvas engine as seen from JavaScript.
#[wasm_bindgen]
pub struct IdeaCanvas {
    core: EngineCore,
}

impl Default for IdeaCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl IdeaCanvas {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self { core: EngineCore::new() }
    }

    /// Build an engine with non-default tunables.
    #[must_use]
    pub fn with_settings(debounce_ms: f64, drag_threshold_px: f64, min_zoom: f64, max_zoom: f64) -> Self {
        let config = EngineConfig { debounce_ms, drag_threshold_px, min_zoom, max_zoom, ..EngineConfig::default() };
        Self { core: EngineCore::with_config(config) }
    }

    // --- Data ---

    /// Replace the board with a `{ ideas, groups }` snapshot.
    ///
    /// # Errors
    ///
    /// Returns the parse error if `json` is not a valid snapshot.
    pub fn load_snapshot(&mut self, json: &str) -> Result<(), String> {
        let snapshot: BoardSnapshot = serde_json::from_str(json).map_err(|e| e.to_string())?;
        self.core.load_snapshot(snapshot);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the parse error if `json` is not a valid idea.
    pub fn apply_create(&mut self, json: &str) -> Result<(), String> {
        let idea: Idea = serde_json::from_str(json).map_err(|e| e.to_string())?;
        self.core.apply_create(idea);
        Ok(())
    }

    /// Apply changed fields to one idea. Returns `false` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed id or field payload.
    pub fn apply_update(&mut self, id: &str, json: &str) -> Result<bool, String> {
        let id = parse_id(id)?;
        let partial = partial_from_json(json)?;
        Ok(self.core.apply_update(&id, &partial))
    }

    /// # Errors
    ///
    /// Returns an error for a malformed id.
    pub fn apply_delete(&mut self, id: &str) -> Result<(), String> {
        let id = parse_id(id)?;
        self.core.apply_delete(&id);
        Ok(())
    }

    /// Remove a group; returns the ids of ideas it left ungrouped as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed id.
    pub fn apply_group_delete(&mut self, id: &str) -> Result<String, String> {
        let id = parse_id(id)?;
        Ok(encode(&self.core.apply_group_delete(&id)))
    }

    // --- Viewport ---

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.core.set_viewport(width, height);
    }

    pub fn zoom_to(&mut self, zoom: f64) -> String {
        actions(&self.core.zoom_to(zoom))
    }

    pub fn center_on(&mut self, x: f64, y: f64) -> String {
        actions(&self.core.center_on(Point::new(x, y)))
    }

    pub fn reset_view(&mut self) -> String {
        actions(&self.core.reset_view())
    }

    // --- Selection ---

    /// Replace the selection with a JSON array of ids.
    ///
    /// # Errors
    ///
    /// Returns the parse error if `json` is not an array of ids.
    pub fn set_selection(&mut self, json: &str) -> Result<String, String> {
        let ids: Vec<IdeaId> = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(actions(&self.core.set_selection(&ids)))
    }

    pub fn select_all(&mut self) -> String {
        actions(&self.core.select_all())
    }

    pub fn clear_selection(&mut self) -> String {
        actions(&self.core.clear_selection())
    }

    // --- Input ---

    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16, mods: u8, now_ms: f64) -> String {
        actions(&self.core.on_pointer_down(Point::new(x, y), Button::from_dom(button), modifiers(mods), now_ms))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, mods: u8, now_ms: f64) -> String {
        actions(&self.core.on_pointer_move(Point::new(x, y), modifiers(mods), now_ms))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, button: i16, mods: u8, now_ms: f64) -> String {
        actions(&self.core.on_pointer_up(Point::new(x, y), Button::from_dom(button), modifiers(mods), now_ms))
    }

    pub fn wheel(&mut self, x: f64, y: f64, dx: f64, dy: f64, mods: u8) -> String {
        actions(&self.core.on_wheel(Point::new(x, y), WheelDelta { dx, dy }, modifiers(mods)))
    }

    /// `coords` holds every active touch as flat `x, y` pairs.
    pub fn touch_start(&mut self, coords: &[f64], now_ms: f64) -> String {
        actions(&self.core.on_touch_start(&touch_points(coords), now_ms))
    }

    pub fn touch_move(&mut self, coords: &[f64], now_ms: f64) -> String {
        actions(&self.core.on_touch_move(&touch_points(coords), now_ms))
    }

    pub fn touch_end(&mut self, x: f64, y: f64, remaining: usize, now_ms: f64) -> String {
        actions(&self.core.on_touch_end(Point::new(x, y), remaining, now_ms))
    }

    pub fn key_down(&mut self, key: &str, mods: u8, now_ms: f64) -> String {
        actions(&self.core.on_key_down(&Key::new(key), modifiers(mods), now_ms))
    }

    // --- Persistence ---

    /// Drive the debounce clock. Call from a timer armed for [`Self::next_due_ms`].
    pub fn tick(&mut self, now_ms: f64) -> String {
        actions(&self.core.tick(now_ms))
    }

    /// Write everything still pending, e.g. on `pagehide`.
    pub fn flush_pending(&mut self) -> String {
        actions(&self.core.flush_pending())
    }

    #[must_use]
    pub fn next_due_ms(&self) -> Option<f64> {
        self.core.next_due_ms()
    }

    pub fn organize(&mut self, now_ms: f64) -> String {
        actions(&self.core.organize(now_ms))
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> String {
        encode(&self.core.selection())
    }

    #[must_use]
    pub fn camera(&self) -> String {
        encode(&self.core.camera())
    }

    /// Current marquee rectangle in screen space, or `null`.
    #[must_use]
    pub fn marquee(&self) -> String {
        encode(&self.core.marquee())
    }

    /// Current board contents in draw order.
    #[must_use]
    pub fn snapshot(&self) -> String {
        encode(&self.core.doc.snapshot())
    }

    /// Name of the active gesture, for debugging overlays.
    #[must_use]
    pub fn gesture(&self) -> String {
        self.core.input.name().to_owned()
    }
}
