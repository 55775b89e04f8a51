//! Arithmetic practice on the number line to 20 and the 100 grid.
//!
//! `engine` holds the pure pieces (problem generation, answer evaluation,
//! hint planning and the deferred-task scheduler), `session` drives one
//! board and the test flow on top of them, and `ui` renders it all with
//! ratatui. The binary in `main.rs` wires these to the terminal.

pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod session;
pub mod store;
pub mod ui;
