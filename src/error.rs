//! Error handling for the recommendation engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document unreadable: {0}")]
    DocumentUnreadable(String),

    #[error("Incompatible vector kind: {0}")]
    IncompatibleVectorKind(String),

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("{kind} {id} not found")]
    EntityNotFound { kind: EntityKind, id: u64 },

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Task queue error: {0}")]
    Queue(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// The kinds of entity a job or a lookup can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Candidate,
    Posting,
    Employer,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Candidate => write!(f, "candidate"),
            EntityKind::Posting => write!(f, "posting"),
            EntityKind::Employer => write!(f, "employer"),
        }
    }
}

impl RecommenderError {
    pub fn not_found(kind: EntityKind, id: u64) -> Self {
        RecommenderError::EntityNotFound { kind, id }
    }

    /// Whether a failed job should be handed back to the queue for another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RecommenderError::ModelUnavailable(_)
                | RecommenderError::Embedding(_)
                | RecommenderError::Io(_)
                | RecommenderError::Storage(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RecommenderError>;

/// Convert anyhow errors coming out of the model loader
impl From<anyhow::Error> for RecommenderError {
    fn from(err: anyhow::Error) -> Self {
        RecommenderError::ModelUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(RecommenderError::ModelUnavailable("offline".into()).is_retryable());
        assert!(RecommenderError::Storage("locked".into()).is_retryable());
        assert!(!RecommenderError::IncompatibleVectorKind("mixed".into()).is_retryable());
        assert!(!RecommenderError::not_found(EntityKind::Candidate, 7).is_retryable());
    }

    #[test]
    fn test_not_found_message() {
        let err = RecommenderError::not_found(EntityKind::Posting, 42);
        assert_eq!(err.to_string(), "posting 42 not found");
    }
}
