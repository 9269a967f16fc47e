//! bricktui: classic falling-bricks game for the terminal.
//!
//! The engine (`game`) is driven by discrete user actions and a wall-clock
//! tick; everything under `app`, `ui`, `input` and `theme` is the terminal host.

pub mod app;
pub mod bricks;
pub mod dispatch;
pub mod field;
pub mod game;
pub mod highscores;
pub mod input;
pub mod rules;
pub mod theme;
pub mod timer;
pub mod ui;

pub use bricks::{Brick, BrickCatalog, BrickColor, BrickTemplate, CatalogError, Position};
pub use dispatch::UserAction;
pub use field::{FIELD_HEIGHT, FIELD_WIDTH, Field};
pub use game::{GameInfo, PauseState, Phase, Tetris};
pub use highscores::{HighScoreFile, HighScoreStore, MemoryHighScore};
pub use theme::{Palette, Preset, Theme, ThemeError};
