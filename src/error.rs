use std::path::PathBuf;

/// Failures surfaced by configuration loading and highscore persistence.
///
/// Nothing in the simulation itself returns this type: placement, collision
/// and state transitions always make progress.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type GameResult<T> = Result<T, GameError>;

impl GameError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
