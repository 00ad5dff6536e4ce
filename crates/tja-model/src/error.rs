use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("entity '{entity}' inherits from '{parent}', which is not declared")]
    MissingParent { entity: String, parent: String },
    #[error("inheritance cycle while resolving '{entity}': {}", .path.join(" -> "))]
    InheritanceCycle { entity: String, path: Vec<String> },
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    #[error("table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Message(String),
}

impl AnalyzerError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
