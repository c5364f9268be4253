//! Error taxonomy for the filing engine.
//!
//! Every failure that crosses the coordinator boundary is translated into one
//! of these variants; lower-layer errors never propagate to callers raw.

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by ingestion, preview, and retry operations.
#[derive(Debug, Error)]
pub enum IngestError {
    /// No authenticated caller identity for the request.
    #[error("no authenticated caller for this request")]
    Unauthorized,

    /// The upload did not name a project.
    #[error("no project supplied for this upload")]
    MissingProject,

    /// A file in the batch exceeds the size ceiling. Aborts the whole batch.
    #[error("file '{file_name}' is {size} bytes, over the {limit} byte limit")]
    FileTooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },

    /// A file in the batch declared a disallowed content type. Aborts the
    /// whole batch.
    #[error("file '{file_name}' has unsupported content type '{content_type}'")]
    InvalidFileType {
        file_name: String,
        content_type: String,
    },

    /// Storage or persistence failed while filing one file. Scoped to that
    /// file; the rest of the batch continues.
    #[error("upload failed for '{file_name}': {message}")]
    UploadFailed { file_name: String, message: String },

    /// The referenced document does not exist (or is deleted).
    #[error("document not found: {0}")]
    NotFound(String),

    /// Unexpected failure while re-queueing a document.
    #[error("retry failed for document '{document_id}': {message}")]
    RetryFailed {
        document_id: String,
        message: String,
    },
}

impl IngestError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::MissingProject => "MISSING_PROJECT",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::InvalidFileType { .. } => "INVALID_FILE_TYPE",
            Self::UploadFailed { .. } => "UPLOAD_FAILED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::RetryFailed { .. } => "RETRY_FAILED",
        }
    }
}

/// Serialized error payload inside a [`ServiceResponse`].
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<&IngestError> for ErrorBody {
    fn from(err: &IngestError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result envelope returned to the CRUD/UI layer:
/// `{success: true, data}` or `{success: false, error: {code, message}}`.
#[derive(Debug, Serialize)]
pub struct ServiceResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> ServiceResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(err: &IngestError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody::from(err)),
        }
    }

    pub fn from_result(result: Result<T, IngestError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::err(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(IngestError::Unauthorized.code(), "UNAUTHORIZED");
        assert_eq!(IngestError::MissingProject.code(), "MISSING_PROJECT");
        assert_eq!(
            IngestError::FileTooLarge {
                file_name: "a.pdf".into(),
                size: 1,
                limit: 0
            }
            .code(),
            "FILE_TOO_LARGE"
        );
        assert_eq!(
            IngestError::NotFound("doc1".into()).code(),
            "NOT_FOUND"
        );
    }

    #[test]
    fn test_response_envelope_shape() {
        let ok = ServiceResponse::ok(42);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert!(json.get("error").is_none());

        let err: ServiceResponse<()> = ServiceResponse::err(&IngestError::Unauthorized);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    }
}
