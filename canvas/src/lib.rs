//! Interaction engine for the idea board canvas.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! interactive side of the board: translating raw DOM input into card moves,
//! selections, and camera changes, hit-testing cards, and debouncing position
//! writes. The host JavaScript layer draws the scene, wires DOM events to
//! [`wasm::IdeaCanvas`], and forwards [`engine::Action::PersistPositions`]
//! batches to the data layer.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Testable [`engine::EngineCore`] and the [`engine::Action`] it emits |
//! | [`wasm`] | JSON-in, JSON-out browser binding |
//! | [`doc`] | Ideas, groups, and the in-memory document store |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing and marquee intersection |
//! | [`debounce`] | Per-card pending-write slots |
//! | [`layout`] | Group-column arrangement and task ordering |
//! | [`consts`] | Shared numeric constants (zoom limits, card size, thresholds) |

pub mod camera;
pub mod consts;
pub mod debounce;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod layout;
pub mod wasm;
