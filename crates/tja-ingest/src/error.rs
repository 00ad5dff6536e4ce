//! Error types for document loading.

use thiserror::Error;

use tja_model::AnalyzerError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("xml error at byte {position}: {message}")]
    Xml { position: u64, message: String },
    #[error("{0}")]
    Malformed(String),
}

impl From<IngestError> for AnalyzerError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::Io(error) => AnalyzerError::Io(error),
            other => AnalyzerError::MalformedDocument(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
