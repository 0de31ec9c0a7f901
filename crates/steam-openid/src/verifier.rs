use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::str;
use std::time::Duration;

use bytes::Bytes;
use http_body::Body as HttpBody;
use tower::Service;
use url::Url;

use crate::client::{self, BoxError, RequestError};
use crate::{CallbackPayload, LOGIN_URL};

/// Performs the protocol-level verification of an OpenID assertion.
///
/// On success, the claimed identifier URL is returned. Implementations must not hold any
/// per-request state; every call stands on its own.
pub trait OpenIdVerifier: Send + Sync {
    fn verify(
        &self,
        payload: &CallbackPayload,
    ) -> impl Future<Output = Result<String, VerifyError>> + Send;
}

#[derive(Debug)]
pub enum VerifyError {
    /// `openid.return_to` does not point at our callback URL.
    ReturnToMismatch,

    /// The payload does not carry a claimed identifier.
    MissingClaimedId,

    /// Steam did not confirm that it issued the assertion.
    InvalidAssertion { body: Bytes },

    /// Steam responded with a non-2xx status code.
    BadStatus { response: http::Response<Bytes> },

    /// The `check_authentication` request could not be encoded.
    Encode(serde_urlencoded::ser::Error),

    /// The `check_authentication` request could not be built.
    BuildRequest(http::Error),

    /// We could not talk to Steam.
    Request(RequestError),
}

impl VerifyError {
    /// Whether Steam (or our own checks) rejected the assertion, as opposed to the verification
    /// not being possible at all.
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::ReturnToMismatch | Self::MissingClaimedId | Self::InvalidAssertion { .. }
        )
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReturnToMismatch => write!(fmt, "`openid.return_to` does not match our return URL"),
            Self::MissingClaimedId => write!(fmt, "payload is missing `openid.claimed_id`"),
            Self::InvalidAssertion { .. } => write!(fmt, "Steam did not confirm the assertion"),
            Self::BadStatus { response } => {
                write!(fmt, "Steam returned a bad status code ({})", response.status())
            },
            Self::Encode(_) => write!(fmt, "failed to encode verification request"),
            Self::BuildRequest(_) => write!(fmt, "failed to build verification request"),
            Self::Request(_) => write!(fmt, "failed to make HTTP request to Steam"),
        }
    }
}

impl StdError for VerifyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Encode(error) => Some(error),
            Self::BuildRequest(error) => Some(error),
            Self::Request(error) => Some(error),
            Self::ReturnToMismatch
            | Self::MissingClaimedId
            | Self::InvalidAssertion { .. }
            | Self::BadStatus { .. } => None,
        }
    }
}

/// An [`OpenIdVerifier`] that asks Steam directly, using `openid.mode=check_authentication`.
///
/// Steam does not support associations, so this is the only way to verify an assertion.
#[derive(Clone)]
pub struct StatelessVerifier<S> {
    http_client: S,
    return_to: Url,
    timeout: Duration,
}

impl<S> fmt::Debug for StatelessVerifier<S> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("StatelessVerifier")
            .field("return_to", &format_args!("{:?}", self.return_to.as_str()))
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<S> StatelessVerifier<S> {
    /// Creates a new [`StatelessVerifier`].
    ///
    /// `return_to` is the URL Steam redirects users back to; assertions addressed to any other URL
    /// are rejected.
    pub const fn new(http_client: S, return_to: Url, timeout: Duration) -> Self {
        Self { http_client, return_to, timeout }
    }

    fn return_to_matches(&self, return_to: &str) -> bool {
        let Ok(return_to) = Url::parse(return_to) else {
            return false;
        };

        return_to.scheme() == self.return_to.scheme()
            && return_to.host() == self.return_to.host()
            && return_to.port_or_known_default() == self.return_to.port_or_known_default()
            && return_to.path() == self.return_to.path()
    }
}

impl<S, ResponseBody> OpenIdVerifier for StatelessVerifier<S>
where
    S: Service<http::Request<Bytes>, Response = http::Response<ResponseBody>>,
    S: Clone + Send + Sync,
    S::Error: Into<BoxError>,
    S::Future: Send,
    ResponseBody: HttpBody<Data: Send> + Send,
    ResponseBody::Error: Into<BoxError>,
{
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(claimed_id = payload.claimed_id.as_deref()),
        ret(level = "debug"),
        err(level = "debug"),
    )]
    async fn verify(&self, payload: &CallbackPayload) -> Result<String, VerifyError> {
        if !payload
            .return_to
            .as_deref()
            .is_some_and(|return_to| self.return_to_matches(return_to))
        {
            return Err(VerifyError::ReturnToMismatch);
        }

        let claimed_id = payload
            .claimed_id
            .clone()
            .ok_or(VerifyError::MissingClaimedId)?;

        let form = payload
            .check_authentication_form()
            .map_err(VerifyError::Encode)?;

        let request = http::Request::post(LOGIN_URL)
            .header(http::header::CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
            .body(Bytes::from(form))
            .map_err(VerifyError::BuildRequest)?;

        let response = client::send(self.http_client.clone(), request, self.timeout)
            .await
            .map_err(VerifyError::Request)?;

        if !response.status().is_success() {
            if let Ok(body) = str::from_utf8(&response.body()[..]) {
                tracing::debug!(body, status = response.status().as_u16(), "Steam returned bad status");
            }

            return Err(VerifyError::BadStatus { response });
        }

        let body = response.into_body();

        if !body[..]
            .split(|&byte| byte == b'\n')
            .any(|line| line.trim_ascii_end() == b"is_valid:true")
        {
            return Err(VerifyError::InvalidAssertion { body });
        }

        Ok(claimed_id)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::future;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http_body_util::Full;

    use super::*;
    use crate::callback_payload::tests::QUERY;

    fn steam_replying(
        status: u16,
        body: &'static str,
        calls: Arc<AtomicUsize>,
    ) -> impl Service<
        http::Request<Bytes>,
        Response = http::Response<Full<Bytes>>,
        Error = Infallible,
        Future: Send,
    > + Clone
    + Send
    + Sync {
        tower::service_fn(move |request: http::Request<Bytes>| {
            calls.fetch_add(1, Ordering::SeqCst);

            assert_eq!(*request.method(), http::Method::POST);
            assert_eq!(request.uri(), LOGIN_URL);

            let form = str::from_utf8(request.body()).unwrap();
            assert!(form.contains("openid.mode=check_authentication"), "{form}");

            let response = http::Response::builder()
                .status(status)
                .body(Full::new(Bytes::from_static(body.as_bytes())))
                .unwrap();

            future::ready(Ok::<_, Infallible>(response))
        })
    }

    fn verifier<S>(http_client: S) -> StatelessVerifier<S> {
        StatelessVerifier::new(
            http_client,
            Url::parse("http://localhost:3000/auth/steam/return").unwrap(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn accepts_valid_assertion() {
        let calls = Arc::new(AtomicUsize::new(0));
        let verifier = verifier(steam_replying(
            200,
            "ns:http://specs.openid.net/auth/2.0\nis_valid:true\n",
            Arc::clone(&calls),
        ));

        let payload = CallbackPayload::from_query(QUERY).unwrap();
        let claimed_id = verifier.verify(&payload).await.unwrap();

        assert_eq!(claimed_id, "https://steamcommunity.com/openid/id/76561198282622073");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejects_invalid_assertion() {
        let calls = Arc::new(AtomicUsize::new(0));
        let verifier = verifier(steam_replying(
            200,
            "ns:http://specs.openid.net/auth/2.0\nis_valid:false\n",
            Arc::clone(&calls),
        ));

        let payload = CallbackPayload::from_query(QUERY).unwrap();
        let error = verifier.verify(&payload).await.unwrap_err();

        assert!(matches!(error, VerifyError::InvalidAssertion { .. }), "{error:?}");
        assert!(error.is_rejection());
    }

    #[tokio::test]
    async fn rejects_foreign_return_to_without_asking_steam() {
        let calls = Arc::new(AtomicUsize::new(0));
        let verifier = verifier(steam_replying(200, "is_valid:true\n", Arc::clone(&calls)));

        let mut payload = CallbackPayload::from_query(QUERY).unwrap();
        payload.return_to = Some(String::from("https://evil.example/auth/steam/return"));

        let error = verifier.verify(&payload).await.unwrap_err();

        assert!(matches!(error, VerifyError::ReturnToMismatch), "{error:?}");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bad_status_is_not_a_rejection() {
        let calls = Arc::new(AtomicUsize::new(0));
        let verifier = verifier(steam_replying(503, "", Arc::clone(&calls)));

        let payload = CallbackPayload::from_query(QUERY).unwrap();
        let error = verifier.verify(&payload).await.unwrap_err();

        assert!(matches!(error, VerifyError::BadStatus { .. }), "{error:?}");
        assert!(!error.is_rejection());
    }
}
