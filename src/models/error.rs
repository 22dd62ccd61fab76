// Application-wide error type, mapped to HTTP responses at the axum boundary.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("bad input: {0}")]
    BadInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("rate limited")]
    RateLimited,

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("redirect not allowed")]
    RedirectNotAllowed,

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::RedirectNotAllowed => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamStatus(_) | Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadInput(_) => "bad-input",
            Self::NotFound(_) => "not-found",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::PayloadTooLarge => "payload-too-large",
            Self::RateLimited => "rate-limited",
            Self::UpstreamUnavailable(_) | Self::UpstreamStatus(_) => "upstream-unavailable",
            Self::RedirectNotAllowed => "redirect-not-allowed",
            Self::Timeout(_) => "timeout",
            Self::Database(_) | Self::Internal(_) => "internal",
        }
    }

    pub fn should_log_as_error(&self) -> bool {
        matches!(self, Self::Internal(_) | Self::Database(_) | Self::UpstreamUnavailable(_))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.should_log_as_error() {
            tracing::error!(error_code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::warn!(error_code = self.error_code(), error = %self, "request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("unhandled error converted to ApiError: {:#}", err);
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(ApiError::BadInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::UpstreamStatus(502).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn only_infra_errors_log_as_error() {
        assert!(!ApiError::BadInput("x".into()).should_log_as_error());
        assert!(!ApiError::RateLimited.should_log_as_error());
        assert!(ApiError::Internal("x".into()).should_log_as_error());
    }
}
