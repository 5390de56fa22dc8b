//! Simulation core of Ljus & Mörker, a top-down maze chase played in the
//! dark: collect crystals, keep your light alive, stay away from what hunts
//! you.
//!
//! [`GameSession`] owns everything and is advanced with
//! [`GameSession::tick`]. Nothing here draws or reads the keyboard; a
//! front-end feeds an [`InputSnapshot`] per frame and reads state back.

pub mod config;
pub mod constants;
pub mod crystal;
pub mod enemy;
pub mod error;
pub mod events;
pub mod geometry;
pub mod highscore;
pub mod input;
pub mod level;
pub mod maze;
pub mod player;
pub mod session;

pub use config::GameConfig;
pub use crystal::Crystal;
pub use enemy::{AiMode, Enemy, Projectile};
pub use error::{GameError, GameResult};
pub use events::{GameObserver, NullObserver};
pub use highscore::{HighscoreBoard, HighscoreEntry, HighscoreStore, JsonFileStore, MemoryStore};
pub use input::InputSnapshot;
pub use level::{LevelFactory, LevelLayout};
pub use maze::Maze;
pub use player::Player;
pub use session::{GameSession, GameState};
