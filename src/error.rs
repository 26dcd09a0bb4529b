//! Error types shared by the auth guard, the service layer and the HTTP boundary.
//!
//! Every failure leaves the server as the same JSON body:
//! `{"success": false, "error": <status>, "message": <text>}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::{repository::RepositoryError, service::ServiceError};

/// AuthError
///
/// Raised only by the auth guard. Both the status and the message are returned
/// to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct AuthError {
    pub status: StatusCode,
    pub message: &'static str,
}

impl AuthError {
    const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    pub const fn missing_header() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "missing header")
    }

    pub const fn malformed_header() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "malformed header")
    }

    pub const fn malformed_token() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "malformed token")
    }

    pub const fn invalid_key() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "invalid key")
    }

    pub const fn token_expired() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "token expired")
    }

    pub const fn invalid_claims() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "invalid claims")
    }

    pub const fn invalid_header() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid header")
    }

    pub const fn permissions_missing() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid claims — permissions not included",
        )
    }

    pub const fn permission_not_found() -> Self {
        Self::new(StatusCode::FORBIDDEN, "permission not found")
    }
}

/// ErrorBody
///
/// Wire shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: u16,
    pub message: String,
}

/// ApiError
///
/// Boundary error type returned by handlers and middleware.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("resource not found")]
    NotFound,

    #[error("unprocessable")]
    Unprocessable,

    #[error("Bad Request")]
    BadRequest,

    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => err.status,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Auth(err) => err.message.to_string(),
            other => other.to_string(),
        }
    }
}

/// Service failures other than not-found are reported as an opaque 422.
/// The underlying detail is logged here and never sent to the client.
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => ApiError::NotFound,
            ServiceError::Invalid(reason) => {
                tracing::debug!(%reason, "rejected drink payload");
                ApiError::Unprocessable
            }
            ServiceError::Repository(err) => {
                log_repository_error(&err);
                ApiError::Unprocessable
            }
        }
    }
}

fn log_repository_error(err: &RepositoryError) {
    tracing::error!(error = ?err, "drink repository failure");
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}
