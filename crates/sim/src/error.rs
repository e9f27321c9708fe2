use spinout_core::GameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("game error: {0}")]
    Game(#[from] GameError),
    #[error("spin limit of {0} reached without a winner")]
    SpinLimit(u32),
    #[error("spin never settled after {0} polls")]
    Stalled(u32),
    #[error("invariant broken: {0}")]
    Invariant(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("serialize error: {0}")]
    Serialize(String),
}

impl From<std::io::Error> for SimError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}
