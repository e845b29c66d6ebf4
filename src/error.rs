use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    #[error("Unsupported network: {0}")]
    InvalidNetwork(String),

    #[error("{0}")]
    Validation(String),
}

/// Uniform externally-visible error body.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_)
            | AppError::Transport(_)
            | AppError::Decode(_)
            | AppError::InvalidNetwork(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_401() {
        let response = AppError::Auth("missing header".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn upstream_errors_map_to_400() {
        for err in [
            AppError::Upstream("invalid invoice".to_string()),
            AppError::Transport("connection refused".to_string()),
            AppError::Decode("not json".to_string()),
            AppError::InvalidNetwork("lnltc".to_string()),
            AppError::Validation("bad wallet id".to_string()),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn upstream_message_is_passed_through_verbatim() {
        let err = AppError::Upstream("request failed with status 503".to_string());
        assert_eq!(err.to_string(), "request failed with status 503");
    }
}
