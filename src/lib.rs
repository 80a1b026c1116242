//! Memory Puzzle core.
//!
//! Board dealing, the per-game session state machine, the controller that
//! drives a session from scheduled callbacks, and score persistence. The GTK
//! front end in `main.rs` only renders what the controller reports.

pub mod config;
pub mod error;
pub mod game;
pub mod scores;

pub use error::{PuzzleError, Result};
