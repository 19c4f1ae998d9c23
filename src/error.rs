use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Storage error")]
    Storage(#[from] std::io::Error),

    #[error("Encoding error")]
    Encoding(#[from] serde_json::Error),

    #[error("Backend error")]
    Backend(#[from] reqwest::Error),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;
