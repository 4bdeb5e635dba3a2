// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Failure reported by an external collaborator (embedding service, vector
/// store or language model).
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{service} request failed: {message}")]
    Transport { service: String, message: String },

    #[error("{service} returned status {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },

    #[error("{service} response could not be decoded: {message}")]
    Decode { service: String, message: String },

    #[error("vector store ({backend}): {message}")]
    Store { backend: String, message: String },
}

impl BackendError {
    pub fn transport(service: &str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            service: service.to_string(),
            message: err.to_string(),
        }
    }

    pub fn decode(service: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            service: service.to_string(),
            message: err.to_string(),
        }
    }

    pub fn store(backend: &str, err: impl std::fmt::Display) -> Self {
        Self::Store {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }

    /// Network hiccups, throttling and server-side failures may succeed on a
    /// later attempt; everything else is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Transport { .. } => true,
            BackendError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load document {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("Indexing collection '{collection}' failed: {source}")]
    Index {
        collection: String,
        #[source]
        source: BackendError,
    },

    #[error("Retrieval failed: {0}")]
    Retrieval(#[source] BackendError),

    #[error("Answer generation failed: {0}")]
    Generation(#[source] BackendError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Index { source, .. } => source.is_retryable(),
            PipelineError::Retrieval(source) | PipelineError::Generation(source) => {
                source.is_retryable()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let throttled = BackendError::Status {
            service: "gemini".to_string(),
            status: 429,
            body: "slow down".to_string(),
        };
        let rejected = BackendError::Status {
            service: "gemini".to_string(),
            status: 400,
            body: "bad request".to_string(),
        };

        assert!(throttled.is_retryable());
        assert!(!rejected.is_retryable());
        assert!(BackendError::transport("groq", "connection reset").is_retryable());
        assert!(!BackendError::decode("groq", "missing field").is_retryable());
    }

    #[test]
    fn test_pipeline_error_delegates_retryability() {
        let err = PipelineError::Index {
            collection: "docs".to_string(),
            source: BackendError::transport("huggingface", "timeout"),
        };
        assert!(err.is_retryable());
        assert!(err.to_string().contains("docs"));

        assert!(!PipelineError::Config("missing key".to_string()).is_retryable());
        assert!(
            !PipelineError::Load {
                path: PathBuf::from("missing.pdf"),
                message: "not found".to_string()
            }
            .is_retryable()
        );
    }
}
