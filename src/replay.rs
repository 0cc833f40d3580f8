//! Replay — drive a board session from a recorded input script.
//!
//! A script is a JSON array of events tagged by `"event"`, each carrying the
//! host clock (`at_ms`) where timing matters. Before every timed event the
//! session's debounce clock is advanced to that time, so a replay produces
//! the same writes a browser session with the same timings would.

use std::path::{Path, PathBuf};

use canvas::camera::Point;
use canvas::doc::{BoardSnapshot, IdeaId};
use canvas::engine::{Action, EngineCore};
use canvas::input::{Button, Key, Modifiers, WheelDelta};
use serde::Deserialize;
use tracing::{debug, info};

use crate::session::BoardSession;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("reading {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("parsing json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One recorded input or host event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    Viewport {
        width: f64,
        height: f64,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Option<Button>,
        #[serde(default)]
        modifiers: Modifiers,
        at_ms: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
        at_ms: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Option<Button>,
        #[serde(default)]
        modifiers: Modifiers,
        at_ms: f64,
    },
    Wheel {
        x: f64,
        y: f64,
        #[serde(default)]
        dx: f64,
        dy: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    TouchStart {
        touches: Vec<[f64; 2]>,
        at_ms: f64,
    },
    TouchMove {
        touches: Vec<[f64; 2]>,
        at_ms: f64,
    },
    TouchEnd {
        x: f64,
        y: f64,
        remaining: usize,
        at_ms: f64,
    },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
        at_ms: f64,
    },
    Select {
        ids: Vec<IdeaId>,
    },
    ZoomTo {
        zoom: f64,
    },
    CenterOn {
        x: f64,
        y: f64,
    },
    ResetView,
    Organize {
        at_ms: f64,
    },
    Tick {
        at_ms: f64,
    },
    Flush,
}

impl ScriptEvent {
    /// Host clock for timed events.
    #[must_use]
    pub fn at_ms(&self) -> Option<f64> {
        match self {
            Self::PointerDown { at_ms, .. }
            | Self::PointerMove { at_ms, .. }
            | Self::PointerUp { at_ms, .. }
            | Self::TouchStart { at_ms, .. }
            | Self::TouchMove { at_ms, .. }
            | Self::TouchEnd { at_ms, .. }
            | Self::Key { at_ms, .. }
            | Self::Organize { at_ms }
            | Self::Tick { at_ms } => Some(*at_ms),
            _ => None,
        }
    }
}

fn points(touches: &[[f64; 2]]) -> Vec<Point> {
    touches.iter().map(|[x, y]| Point::new(*x, *y)).collect()
}

/// Feed one event to the engine.
fn dispatch(engine: &mut EngineCore, event: &ScriptEvent) -> Vec<Action> {
    match event {
        ScriptEvent::Viewport { width, height } => {
            engine.set_viewport(*width, *height);
            Vec::new()
        }
        ScriptEvent::PointerDown { x, y, button, modifiers, at_ms } => {
            engine.on_pointer_down(Point::new(*x, *y), button.unwrap_or(Button::Primary), *modifiers, *at_ms)
        }
        ScriptEvent::PointerMove { x, y, modifiers, at_ms } => {
            engine.on_pointer_move(Point::new(*x, *y), *modifiers, *at_ms)
        }
        ScriptEvent::PointerUp { x, y, button, modifiers, at_ms } => {
            engine.on_pointer_up(Point::new(*x, *y), button.unwrap_or(Button::Primary), *modifiers, *at_ms)
        }
        ScriptEvent::Wheel { x, y, dx, dy, modifiers } => {
            engine.on_wheel(Point::new(*x, *y), WheelDelta { dx: *dx, dy: *dy }, *modifiers)
        }
        ScriptEvent::TouchStart { touches, at_ms } => engine.on_touch_start(&points(touches), *at_ms),
        ScriptEvent::TouchMove { touches, at_ms } => engine.on_touch_move(&points(touches), *at_ms),
        ScriptEvent::TouchEnd { x, y, remaining, at_ms } => engine.on_touch_end(Point::new(*x, *y), *remaining, *at_ms),
        ScriptEvent::Key { key, modifiers, at_ms } => engine.on_key_down(&Key::new(key.as_str()), *modifiers, *at_ms),
        ScriptEvent::Select { ids } => engine.set_selection(ids),
        ScriptEvent::ZoomTo { zoom } => engine.zoom_to(*zoom),
        ScriptEvent::CenterOn { x, y } => engine.center_on(Point::new(*x, *y)),
        ScriptEvent::ResetView => engine.reset_view(),
        ScriptEvent::Organize { at_ms } => engine.organize(*at_ms),
        ScriptEvent::Tick { .. } => Vec::new(),
        ScriptEvent::Flush => engine.flush_pending(),
    }
}

/// Replay `events` against `session`, returning every action produced in order.
pub async fn run(session: &mut BoardSession, events: &[ScriptEvent]) -> Vec<Action> {
    let mut produced = Vec::new();
    for event in events {
        if let Some(now_ms) = event.at_ms() {
            produced.extend(session.tick(now_ms).await);
        }
        debug!(?event, "replaying");
        let actions = dispatch(session.engine_mut(), event);
        produced.extend(session.route(actions).await);
    }
    info!(events = events.len(), actions = produced.len(), "script replayed");
    produced
}

/// Parse a JSON event script.
///
/// # Errors
///
/// Returns [`ReplayError::Parse`] for malformed JSON or unknown events.
pub fn parse_script(json: &str) -> Result<Vec<ScriptEvent>, ReplayError> {
    Ok(serde_json::from_str(json)?)
}

/// # Errors
///
/// Returns [`ReplayError::Io`] if the file can't be read, or
/// [`ReplayError::Parse`] if it isn't a valid script.
pub async fn load_script(path: &Path) -> Result<Vec<ScriptEvent>, ReplayError> {
    parse_script(&read(path).await?)
}

/// Load a `{ ideas, groups }` board snapshot to seed the store.
///
/// # Errors
///
/// Returns [`ReplayError::Io`] if the file can't be read, or
/// [`ReplayError::Parse`] if it isn't a valid snapshot.
pub async fn load_seed(path: &Path) -> Result<BoardSnapshot, ReplayError> {
    Ok(serde_json::from_str(&read(path).await?)?)
}

async fn read(path: &Path) -> Result<String, ReplayError> {
    tokio::fs::read_to_string(path).await.map_err(|source| ReplayError::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
#[path = "replay_test.rs"]
mod tests;
