use thiserror::Error;

#[derive(Error, Debug)]
pub enum MsaError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Invariant Violation: {0}")]
    Invariant(String),

    #[error("FASTA Parsing Error: {0}")]
    Parse(String),

    #[error("Alignment Validation Error: {0}")]
    Validation(String),
}

pub type MsaResult<T> = Result<T, MsaError>;
