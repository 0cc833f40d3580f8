//! Host side of the idea board: the session that drives the canvas engine,
//! the store it persists to, and the background position writer.

pub mod config;
pub mod persistence;
pub mod replay;
pub mod session;
pub mod store;
pub mod todo;
