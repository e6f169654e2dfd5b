use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use thiserror::Error;

use crate::models::ErrorBody;

/// Failure talking to an external embedding or completion endpoint.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum RagError {
    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),

    #[error("No documents indexed for retrieval. Please upload documents first.")]
    EmptyStore,

    #[error("embedding dimension mismatch: store holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("document index {index} out of range (store holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Failed to create embedding: {0}")]
    Embedding(#[source] ProviderError),

    #[error("Failed to generate completion: {0}")]
    Completion(#[source] ProviderError),

    #[error("Failed to decode upload: {0}")]
    Decode(String),

    #[error("No file provided in upload")]
    MissingFile,

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),
}

impl RagError {
    /// Client-caused errors are 4xx, everything else is on our side or the provider's.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RagError::EmptyInput(_) | RagError::EmptyStore | RagError::MissingFile => {
                StatusCode::BAD_REQUEST
            }
            RagError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RagError::DimensionMismatch { .. }
            | RagError::IndexOutOfRange { .. }
            | RagError::Embedding(_)
            | RagError::Completion(_)
            | RagError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type RagResult<T> = Result<T, RagError>;

/// Error as it leaves the HTTP surface.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn upload_failed(err: RagError) -> Self {
        Self {
            status: err.status_code(),
            detail: format!("Upload failed: {}", err),
        }
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        Self {
            status: err.status_code(),
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(status = %self.status, "HTTP error: {}", self.detail);
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        assert_eq!(
            RagError::EmptyInput("Search query").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RagError::EmptyStore.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(RagError::MissingFile.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_errors_are_server_errors() {
        let err = RagError::Embedding(ProviderError::Timeout(Duration::from_secs(5)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("timed out"));

        let err = RagError::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_empty_query_message() {
        assert_eq!(
            RagError::EmptyInput("Search query").to_string(),
            "Search query cannot be empty"
        );
    }

    #[test]
    fn test_upload_failed_keeps_status() {
        let err = ApiError::upload_failed(RagError::Decode("invalid utf-8".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.detail.starts_with("Upload failed: "));

        let err = ApiError::upload_failed(RagError::EmptyInput("Document"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = ApiError::upload_failed(RagError::PayloadTooLarge("limit".to_string()));
        assert_eq!(err.status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
