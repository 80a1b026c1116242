pub mod board;
pub mod controller;
pub mod difficulty;
pub mod scheduler;
pub mod session;
pub mod theme;

pub use board::{Board, GridSize};
pub use controller::{GameController, Timing};
pub use difficulty::Difficulty;
pub use scheduler::{Scheduler, TaskId};
pub use session::{CellState, IgnoreReason, Phase, RevealOutcome, Session, SessionSnapshot};
pub use theme::{Theme, ThemeRegistry};

/// Points awarded for every confirmed pair.
pub const SCORE_PER_MATCH: u32 = 10;
