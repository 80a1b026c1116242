pub mod app;
pub mod board;
pub mod dialogs;
pub mod hud;
pub mod mode_dialogs;
pub mod records;
pub mod scene;
pub mod state;
pub mod timers;
