//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers
//! turn domain failures into consistent JSON responses and status codes.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        Error::internal("Internal server error")
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(message = self.message(), "internal error surfaced to client");
        }
        HttpResponse::build(self.status_code()).json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::invalid(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
    #[case::unauthorized(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)]
    #[case::forbidden(ErrorCode::Forbidden, StatusCode::FORBIDDEN)]
    #[case::not_found(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
    #[case::conflict(ErrorCode::Conflict, StatusCode::CONFLICT)]
    #[case::upstream(ErrorCode::UpstreamError, StatusCode::BAD_GATEWAY)]
    #[case::unavailable(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
    #[case::internal(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
    fn codes_map_to_statuses(#[case] code: ErrorCode, #[case] expected: StatusCode) {
        assert_eq!(status_for(code), expected);
    }

    #[test]
    fn internal_errors_are_redacted() {
        let redacted = redact_if_internal(&Error::internal("pool checkout died"));
        assert_eq!(redacted.message(), "Internal server error");

        let untouched = redact_if_internal(&Error::conflict("duplicate"));
        assert_eq!(untouched.message(), "duplicate");
    }

    #[actix_web::test]
    async fn error_response_serialises_code_and_message() {
        let response = Error::upstream("CheapShark timed out").error_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = actix_web::body::to_bytes(response.into_body())
            .await
            .expect("body bytes");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("error payload");
        assert_eq!(
            value.get("code").and_then(|v| v.as_str()),
            Some("upstream_error")
        );
        assert_eq!(
            value.get("message").and_then(|v| v.as_str()),
            Some("CheapShark timed out")
        );
    }
}
