use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("invalid match payload: {0}")]
    InvalidPayload(String),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TimelineError>;
