use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::Error;

/// Error returned from route handlers.
///
/// Validation failures are echoed to the caller; anything else is logged
/// and replaced by the operation's generic failure message.
#[derive(Debug)]
pub enum ApiError {
    /// The request was rejected before any I/O.
    BadRequest(String),
    /// The request body or query string could not be decoded.
    Rejected {
        /// Status chosen by the extractor.
        status: StatusCode,
        /// Extractor message.
        message: String,
    },
    /// The operation failed inside the service.
    Internal {
        /// Message shown to the caller.
        message: &'static str,
        /// Full error, logged only.
        detail: String,
    },
}

impl ApiError {
    /// Wrap a service error, using `message` if it is not the caller's fault.
    #[must_use]
    pub fn from_service(message: &'static str, err: Error) -> Self {
        if err.is_validation() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal {
                message,
                detail: err.to_string(),
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Rejected { status, message } => (status, message),
            ApiError::Internal { message, detail } => {
                tracing::error!("{message}: {detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = ApiError::from_service(
            "Error submitting feedback",
            Error::MissingFields {
                fields: vec!["message"],
            },
        );
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Missing required fields"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_read_error_is_generic() {
        let err = ApiError::from_service(
            "Error fetching stats",
            Error::StoreRead {
                path: PathBuf::from("/data/feedback.json"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            },
        );
        assert!(matches!(err, ApiError::Internal { message: "Error fetching stats", .. }));
    }

    #[test]
    fn test_storage_error_is_generic() {
        let err = ApiError::from_service(
            "Error submitting feedback",
            Error::StoreWrite {
                path: PathBuf::from("/secret/path/feedback.json"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            },
        );
        match &err {
            ApiError::Internal { message, detail } => {
                assert_eq!(*message, "Error submitting feedback");
                assert!(detail.contains("/secret/path"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
