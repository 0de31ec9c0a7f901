//! Plumbing for making HTTP requests to Steam through an arbitrary [`Service`].
//!
//! Nothing in this crate depends on a concrete HTTP client. Callers pass in any
//! `Service<http::Request<Bytes>>` (e.g. an adapted `reqwest::Client`), which also makes it easy to
//! substitute a fake in tests.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tower::{Service, ServiceExt};

/// A type-erased error, as produced by most [`tower`] middleware.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Responses with larger bodies are rejected with [`RequestError::ResponseTooLarge`].
pub const MAX_RESPONSE_BODY_SIZE: usize = 1024 * 1024;

/// Failure to get a fully buffered response from a service.
#[derive(Debug)]
pub enum RequestError {
    /// The service itself failed (connection refused, TLS error, ...).
    Service(BoxError),

    /// The service did not produce a full response within the configured timeout.
    Timeout(Duration),

    /// The response body could not be read to completion.
    BufferResponseBody(BoxError),

    /// The response body exceeded [`MAX_RESPONSE_BODY_SIZE`].
    ResponseTooLarge { limit: usize },
}

impl fmt::Display for RequestError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(_) => write!(fmt, "failed to make http request"),
            Self::Timeout(timeout) => write!(fmt, "http request timed out after {timeout:?}"),
            Self::BufferResponseBody(_) => write!(fmt, "failed to buffer response body"),
            Self::ResponseTooLarge { limit } => {
                write!(fmt, "response body exceeded {limit} bytes")
            },
        }
    }
}

impl StdError for RequestError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Service(error) | Self::BufferResponseBody(error) => Some(&**error),
            Self::Timeout(_) | Self::ResponseTooLarge { .. } => None,
        }
    }
}

/// Drives `service` to completion for a single request and buffers the response body.
///
/// The whole exchange, including reading the body, is bounded by `timeout`.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(
        request.method = %request.method(),
        request.host = request.uri().host(),
        request.path = request.uri().path(),
    ),
    err(level = "debug"),
)]
pub async fn send<S, ResponseBody>(
    service: S,
    request: http::Request<Bytes>,
    timeout: Duration,
) -> Result<http::Response<Bytes>, RequestError>
where
    S: Service<http::Request<Bytes>, Response = http::Response<ResponseBody>>,
    S::Error: Into<BoxError>,
    ResponseBody: HttpBody,
    ResponseBody::Error: Into<BoxError>,
{
    let exchange = async move {
        let (response, body) = service
            .oneshot(request)
            .await
            .map_err(|error| RequestError::Service(error.into()))?
            .into_parts();

        let body = Limited::new(body, MAX_RESPONSE_BODY_SIZE)
            .collect()
            .await
            .map_err(|error| {
                if error.is::<LengthLimitError>() {
                    RequestError::ResponseTooLarge { limit: MAX_RESPONSE_BODY_SIZE }
                } else {
                    RequestError::BufferResponseBody(error)
                }
            })?
            .to_bytes();

        Ok(http::Response::from_parts(response, body))
    };

    tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| RequestError::Timeout(timeout))?
}
