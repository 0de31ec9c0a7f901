use std::panic::Location;

use axum::response::{IntoResponse, Response};

/// The error response returned by handlers.
#[derive(Debug)]
pub struct ErrorResponse(ErrorKind);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorKind {
    InternalServerError,
    BadGateway,
}

impl ErrorResponse {
    #[track_caller]
    pub(crate) fn internal_server_error<E>(error: E) -> Self
    where
        E: std::error::Error + 'static,
    {
        tracing::error!(
            error = &error as &dyn std::error::Error,
            loc = %Location::caller(),
            "internal server error",
        );

        Self(ErrorKind::InternalServerError)
    }

    #[track_caller]
    pub(crate) fn bad_gateway<E>(error: E) -> Self
    where
        E: std::error::Error + 'static,
    {
        tracing::warn!(
            error = &error as &dyn std::error::Error,
            loc = %Location::caller(),
            "failed to talk to Steam",
        );

        Self(ErrorKind::BadGateway)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            ErrorKind::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::BadGateway => http::StatusCode::BAD_GATEWAY,
        }
        .into_response()
    }
}
