use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tick rate must be non-zero")]
    ZeroTickRate,

    #[error("line interval minimum {min}ms exceeds maximum {max}ms")]
    IntervalRange { min: u64, max: u64 },

    #[error("line interval maximum must be non-zero")]
    ZeroInterval,

    #[error("line travel time must be non-zero")]
    ZeroTravelTime,

    #[error("fade needs at least one step")]
    ZeroFadeSteps,

    #[error("invalid chunk piece range {min}..={max}")]
    PieceRange { min: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("no text blocks found in {0}")]
    EmptyText(String),
}
