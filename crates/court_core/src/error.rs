use thiserror::Error;

#[derive(Error, Debug)]
pub enum CourtError {
    #[error("Invalid resolution request: {0}")]
    InvalidResolution(String),

    #[error("A match resolution is already in progress")]
    ResolutionInFlight,

    #[error("Invalid entrant name: {0}")]
    InvalidEntrant(String),

    #[error("Entrant already present: {name}")]
    DuplicateEntrant { name: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Match not ready: {0}")]
    MatchNotReady(String),

    #[error("Invalid rules configuration: {0}")]
    InvalidConfig(String),

    #[error("History import rejected: {0}")]
    Import(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, CourtError>;
