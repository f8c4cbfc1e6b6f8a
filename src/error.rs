use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::users::repo::RepoError;

pub type AppResult<T> = Result<T, AppError>;

/// Errors a handler can answer with.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body could not be decoded.
    #[error("invalid request body: {0}")]
    Decode(String),
    /// Missing or malformed parameter.
    #[error("{0}")]
    Validation(String),
    #[error("user not found")]
    NotFound,
    /// Driver or query failure. Detail is logged, never sent to the client.
    #[error("storage failure: {0}")]
    Storage(RepoError),
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => AppError::NotFound,
            other => AppError::Storage(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Decode(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Storage(e) => {
                error!(error = %e, "storage call failed");
                "internal server error".to_string()
            }
            other => {
                warn!(error = %other, %status, "request rejected");
                other.to_string()
            }
        };
        (status, body).into_response()
    }
}
