use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("User already exists")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authorized, no token")]
    MissingToken,

    #[error("Not authorized, token failed")]
    InvalidToken,

    #[error("Not authorized, user not found")]
    UnknownUser,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Failed(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DuplicateEmail | AppError::Failed(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::UnknownUser => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            other => AppError::Failed(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Failed(e) = &self {
            error!(error = %e, "request failed");
        }
        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Response body for panics caught by the middleware stack.
pub fn server_error() -> Response {
    let body = Json(json!({ "success": false, "error": "Server Error" }));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(AppError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("User not found").status(), StatusCode::NOT_FOUND);
        let failed = AppError::from(anyhow::anyhow!("disk full"));
        assert_eq!(failed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(failed.to_string(), "disk full");
    }

    #[test]
    fn duplicate_store_error_maps_to_duplicate_email() {
        let err = AppError::from(StoreError::DuplicateEmail);
        assert!(matches!(err, AppError::DuplicateEmail));
    }
}
