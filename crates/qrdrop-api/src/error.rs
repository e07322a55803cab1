use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use qrdrop_types::api::ErrorResponse;
use qrdrop_types::{Denial, Error as CoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::MalformedRecord(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::Unauthorized(Denial::LoginRequired)) => StatusCode::UNAUTHORIZED,
            ApiError::Core(CoreError::Unauthorized(Denial::ManagerRequired)) => StatusCode::FORBIDDEN,
            ApiError::Core(CoreError::AlreadyPremium | CoreError::NotPremium) => StatusCode::CONFLICT,
            ApiError::Core(CoreError::UnknownKind(_)) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Don't leak storage details to the client
            ApiError::Internal(e) => {
                error!("Internal error: {:#}", e);
                "internal server error".to_string()
            }
            ApiError::Core(e @ CoreError::MalformedRecord(_)) => {
                error!("{}", e);
                "stored transfer is unreadable".to_string()
            }
            other => {
                warn!("Request rejected ({}): {}", status, other);
                other.to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
