use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovdiffError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Invalid coverage summary: {0}")]
    InvalidInput(String),

    #[error("No coverage summary matches '{0}'")]
    NoMatches(String),
}

pub type Result<T> = std::result::Result<T, CovdiffError>;
