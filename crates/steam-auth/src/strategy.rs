use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http_body::Body as HttpBody;
use steam_id::SteamId;
use steam_openid::client::BoxError;
use steam_openid::{CallbackPayload, OpenIdVerifier, StatelessVerifier, VerifyError};
use tower::Service;
use url::Url;

use crate::identity::verify_identity;
use crate::web_api::{ProfileEnricher, ProfileError};
use crate::{Failure, OptionsError, Outcome, Profile, StrategyOptions};

/// Everything we know about a user after they have been authenticated.
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// The verified claimed identifier, e.g. `https://steamcommunity.com/openid/id/7656119...`.
    pub identifier: String,

    pub steam_id: SteamId,

    pub profile: Profile,

    /// The raw callback parameters.
    pub payload: CallbackPayload,
}

/// Turns an [`Authenticated`] Steam user into an application user.
///
/// This is implemented for any `async` closure of the right shape.
pub trait Validate: Send + Sync {
    type User;
    type Error;

    fn validate(
        &self,
        authenticated: Authenticated,
    ) -> impl Future<Output = Outcome<Self::User, Self::Error>> + Send;
}

impl<F, Fut, User, E> Validate for F
where
    F: Fn(Authenticated) -> Fut + Send + Sync,
    Fut: Future<Output = Outcome<User, E>> + Send,
{
    type User = User;
    type Error = E;

    fn validate(
        &self,
        authenticated: Authenticated,
    ) -> impl Future<Output = Outcome<Self::User, Self::Error>> + Send {
        self(authenticated)
    }
}

/// Something went wrong while authenticating a user.
#[derive(Debug)]
pub enum AuthError<E = Infallible> {
    /// The assertion could not be verified with Steam.
    OpenId(VerifyError),

    /// The user's profile could not be fetched.
    Profile(ProfileError),

    /// The [`Validate`] callback failed.
    Validate(E),
}

impl<E> AuthError<E> {
    /// Whether a request to Steam is to blame.
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::OpenId(_) | Self::Profile(_))
    }
}

impl<E: fmt::Display> fmt::Display for AuthError<E> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenId(error) => write!(fmt, "failed to verify assertion with Steam: {error}"),
            Self::Profile(error) => write!(fmt, "failed to fetch Steam profile: {error}"),
            Self::Validate(error) => write!(fmt, "failed to validate user: {error}"),
        }
    }
}

impl<E: StdError + 'static> StdError for AuthError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::OpenId(error) => Some(error),
            Self::Profile(error) => Some(error),
            Self::Validate(error) => Some(error),
        }
    }
}

/// Authenticates users with Steam.
///
/// A strategy holds no per-attempt state; it can be cloned and shared freely, and any number of
/// [`authenticate()`] calls may run at the same time.
///
/// [`authenticate()`]: Strategy::authenticate
pub struct Strategy<V, O, S> {
    options: Arc<StrategyOptions>,
    openid: O,
    enricher: ProfileEnricher<S>,
    validate: Arc<V>,
}

impl<V, O: Clone, S: Clone> Clone for Strategy<V, O, S> {
    fn clone(&self) -> Self {
        Self {
            options: Arc::clone(&self.options),
            openid: self.openid.clone(),
            enricher: self.enricher.clone(),
            validate: Arc::clone(&self.validate),
        }
    }
}

impl<V, O: fmt::Debug, S> fmt::Debug for Strategy<V, O, S> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Strategy")
            .field("options", &self.options)
            .field("openid", &self.openid)
            .field("enricher", &self.enricher)
            .finish_non_exhaustive()
    }
}

impl<V, S: Clone> Strategy<V, StatelessVerifier<S>, S> {
    /// Creates a strategy that verifies assertions by asking Steam directly.
    ///
    /// `http_client` is used both for verification and for fetching profiles.
    pub fn new(options: StrategyOptions, http_client: S, validate: V) -> Result<Self, OptionsError> {
        let openid = StatelessVerifier::new(
            http_client.clone(),
            options.return_url.clone(),
            options.request_timeout,
        );

        Self::with_verifier(options, openid, http_client, validate)
    }
}

impl<V, O, S> Strategy<V, O, S> {
    pub const NAME: &'static str = "steam";

    /// Creates a strategy with a custom [`OpenIdVerifier`].
    pub fn with_verifier(
        options: StrategyOptions,
        openid: O,
        http_client: S,
        validate: V,
    ) -> Result<Self, OptionsError> {
        options.validate()?;

        let enricher =
            ProfileEnricher::new(http_client, options.api_key.as_str(), options.request_timeout);

        Ok(Self {
            options: Arc::new(options),
            openid,
            enricher,
            validate: Arc::new(validate),
        })
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn options(&self) -> &StrategyOptions {
        &self.options
    }

    /// The URL to redirect users to for logging in with Steam.
    pub fn authorization_url(&self) -> Result<Url, serde_urlencoded::ser::Error> {
        steam_openid::login_url(&self.options.return_url, &self.options.realm)
    }
}

impl<V, O, S, ResponseBody> Strategy<V, O, S>
where
    V: Validate,
    O: OpenIdVerifier,
    S: Service<http::Request<Bytes>, Response = http::Response<ResponseBody>>,
    S: Clone + Send + Sync,
    S::Error: Into<BoxError>,
    S::Future: Send,
    ResponseBody: HttpBody<Data: Send> + Send,
    ResponseBody::Error: Into<BoxError>,
{
    /// Handles the request Steam redirected the user back with.
    ///
    /// `query` is the raw query string of that request.
    pub fn authenticate(
        &self,
        query: &str,
    ) -> impl Future<Output = Outcome<V::User, AuthError<V::Error>>> + Send {
        // Spelling out `Send` here lets callers that await this inside another future (e.g. an
        // axum handler) prove `Send` without leaking through the `async fn` body.
        self.authenticate_inner(query)
    }

    #[tracing::instrument(
        name = "authenticate",
        level = "debug",
        skip_all,
        fields(steam_id = tracing::field::Empty)
    )]
    async fn authenticate_inner(&self, query: &str) -> Outcome<V::User, AuthError<V::Error>> {
        let payload = match CallbackPayload::from_query(query) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::debug!(%error, "failed to parse callback payload");
                return Outcome::Failure(Failure::INVALID_RESPONSE);
            },
        };

        if payload.is_cancel() {
            tracing::debug!("user canceled login");
            return Outcome::Failure(Failure::CANCELED);
        }

        if payload.mode != "id_res" {
            tracing::debug!(mode = %payload.mode, "unexpected `openid.mode`");
            return Outcome::Failure(Failure::UNVERIFIED);
        }

        let identifier = match self.openid.verify(&payload).await {
            Ok(identifier) => identifier,
            Err(error) if error.is_rejection() => {
                tracing::debug!(%error, "assertion rejected");
                return Outcome::Failure(Failure::UNVERIFIED);
            },
            Err(error) => return Outcome::Error(AuthError::OpenId(error)),
        };

        let steam_id = match verify_identity(&payload, &identifier) {
            Ok(steam_id) => steam_id,
            Err(rejected) => return Outcome::Failure(rejected.into()),
        };

        tracing::Span::current().record("steam_id", tracing::field::display(steam_id));

        let profile = match self.enricher.enrich(steam_id, self.options.profile).await {
            Ok(profile) => profile,
            Err(error) => return Outcome::Error(AuthError::Profile(error)),
        };

        tracing::debug!("user authenticated");

        self.validate
            .validate(Authenticated { identifier, steam_id, profile, payload })
            .await
            .map_err(AuthError::Validate)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use http_body_util::Full;
    use steam_openid::client::RequestError;
    use steam_openid::{IDENTITY_URL_PREFIX, LOGIN_URL, OPENID_NS};

    use super::*;
    use crate::ProfileErrorKind;
    use crate::web_api::tests::player_json;

    const STEAM_ID: u64 = 76561198282622073;

    fn options() -> StrategyOptions {
        StrategyOptions::new(
            "http://localhost:3000/auth/steam/return".parse().unwrap(),
            "http://localhost:3000/".parse().unwrap(),
            "secret",
        )
    }

    fn callback_query(steam_id: u64) -> String {
        let identity = format!("{IDENTITY_URL_PREFIX}{steam_id}");

        serde_urlencoded::to_string(CallbackPayload {
            ns: Some(OPENID_NS.to_owned()),
            mode: String::from("id_res"),
            op_endpoint: Some(LOGIN_URL.to_owned()),
            claimed_id: Some(identity.clone()),
            identity: Some(identity),
            return_to: Some(String::from("http://localhost:3000/auth/steam/return")),
            response_nonce: Some(String::from("2024-06-15T00:36:00Zabc")),
            invalidate_handle: None,
            assoc_handle: Some(String::from("1234567890")),
            signed: Some(String::from("signed,op_endpoint,claimed_id,identity,return_to")),
            sig: Some(String::from("c2lnbmF0dXJl")),
        })
        .unwrap()
    }

    /// Answers with `result` for every assertion, without talking to anyone.
    #[derive(Clone)]
    struct FakeVerifier {
        result: fn(&CallbackPayload) -> Result<String, VerifyError>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeVerifier {
        fn trusting() -> Self {
            Self::new(|payload| Ok(payload.claimed_id.clone().unwrap()))
        }

        fn new(result: fn(&CallbackPayload) -> Result<String, VerifyError>) -> Self {
            Self { result, calls: Arc::new(AtomicUsize::new(0)) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl OpenIdVerifier for FakeVerifier {
        async fn verify(&self, payload: &CallbackPayload) -> Result<String, VerifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)(payload)
        }
    }

    /// A fake Steam: `check_authentication` always succeeds, and `GetPlayerSummaries` knows every
    /// player.
    fn steam(
        status: u16,
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

            let body = if *request.method() == http::Method::POST {
                assert_eq!(request.uri(), LOGIN_URL);
                String::from("ns:http://specs.openid.net/auth/2.0\nis_valid:true\n")
            } else {
                let query = request
                    .uri()
                    .query()
                    .map(|query| serde_urlencoded::from_str::<HashMap<String, String>>(query))
                    .unwrap()
                    .unwrap();

                let player = player_json(&query["steamids"]);

                format!(r#"{{ "response": {{ "players": [{player}] }} }}"#)
            };

            let response = http::Response::builder()
                .status(status)
                .body(Full::new(Bytes::from(body)))
                .unwrap();

            async move {
                tokio::task::yield_now().await;
                Ok::<_, Infallible>(response)
            }
        })
    }

    async fn accept(authenticated: Authenticated) -> Outcome<Authenticated, Infallible> {
        Outcome::Success(authenticated)
    }

    #[tokio::test]
    async fn authenticates_user_with_profile() {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy = Strategy::new(options(), steam(200, Arc::clone(&calls)), accept).unwrap();

        let Outcome::Success(user) = strategy.authenticate(&callback_query(STEAM_ID)).await else {
            panic!("expected success");
        };

        assert_eq!(user.identifier, format!("https://steamcommunity.com/openid/id/{STEAM_ID}"));
        assert_eq!(user.steam_id, STEAM_ID);
        assert_eq!(user.profile.id, STEAM_ID);
        assert_eq!(user.profile.display_name.as_deref(), Some("player-76561198282622073"));
        assert_eq!(user.profile.photos.map(|photos| photos.len()), Some(3));
        assert_eq!(user.payload.mode, "id_res");

        // one `check_authentication`, one `GetPlayerSummaries`
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn skips_profile_when_disabled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let verifier = FakeVerifier::trusting();
        let strategy = Strategy::with_verifier(
            options().with_profile(false),
            verifier.clone(),
            steam(200, Arc::clone(&calls)),
            accept,
        )
        .unwrap();

        let Outcome::Success(user) = strategy.authenticate(&callback_query(STEAM_ID)).await else {
            panic!("expected success");
        };

        assert_eq!(user.profile, Profile::minimal(SteamId::from_u64(STEAM_ID)));
        assert_eq!(verifier.calls(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_query_fails() {
        let verifier = FakeVerifier::trusting();
        let strategy = Strategy::with_verifier(
            options(),
            verifier.clone(),
            steam(200, Arc::default()),
            accept,
        )
        .unwrap();

        let outcome = strategy.authenticate("foo=bar").await;

        assert!(matches!(
            outcome,
            Outcome::Failure(ref failure) if *failure == Failure::INVALID_RESPONSE,
        ));
        assert_eq!(verifier.calls(), 0);
    }

    #[tokio::test]
    async fn cancel_fails_without_verification() {
        let verifier = FakeVerifier::trusting();
        let strategy = Strategy::with_verifier(
            options(),
            verifier.clone(),
            steam(200, Arc::default()),
            accept,
        )
        .unwrap();

        let outcome = strategy.authenticate("openid.mode=cancel").await;

        assert!(matches!(outcome, Outcome::Failure(ref failure) if *failure == Failure::CANCELED));
        assert_eq!(verifier.calls(), 0);
    }

    #[tokio::test]
    async fn rejected_assertion_fails() {
        let verifier =
            FakeVerifier::new(|_| Err(VerifyError::InvalidAssertion { body: Bytes::new() }));
        let strategy =
            Strategy::with_verifier(options(), verifier, steam(200, Arc::default()), accept)
                .unwrap();

        let outcome = strategy.authenticate(&callback_query(STEAM_ID)).await;

        assert!(matches!(outcome, Outcome::Failure(ref failure) if *failure == Failure::UNVERIFIED));
    }

    #[tokio::test]
    async fn unreachable_verifier_is_an_error() {
        let verifier = FakeVerifier::new(|_| {
            Err(VerifyError::Request(RequestError::Timeout(Duration::from_secs(10))))
        });
        let strategy =
            Strategy::with_verifier(options(), verifier, steam(200, Arc::default()), accept)
                .unwrap();

        let outcome = strategy.authenticate(&callback_query(STEAM_ID)).await;

        assert!(matches!(outcome, Outcome::Error(AuthError::OpenId(_))));
    }

    #[tokio::test]
    async fn foreign_identity_fails_without_fetching_profile() {
        let calls = Arc::new(AtomicUsize::new(0));
        let verifier = FakeVerifier::new(|_| {
            Ok(String::from("https://evil.example/openid/id/76561198282622073"))
        });
        let strategy = Strategy::with_verifier(
            options(),
            verifier,
            steam(200, Arc::clone(&calls)),
            accept,
        )
        .unwrap();

        let outcome = strategy.authenticate(&callback_query(STEAM_ID)).await;

        assert!(matches!(
            outcome,
            Outcome::Failure(ref failure) if failure.message() == "Claimed identity is invalid.",
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn profile_error_is_an_error() {
        let strategy = Strategy::with_verifier(
            options(),
            FakeVerifier::trusting(),
            steam(500, Arc::default()),
            accept,
        )
        .unwrap();

        let outcome = strategy.authenticate(&callback_query(STEAM_ID)).await;

        let Outcome::Error(AuthError::Profile(error)) = outcome else {
            panic!("expected profile error");
        };

        assert_eq!(error.kind(), ProfileErrorKind::Upstream);
    }

    #[tokio::test]
    async fn validate_outcome_is_passed_through() {
        #[derive(Debug, PartialEq)]
        struct Banned;

        let strategy = Strategy::with_verifier(
            options().with_profile(false),
            FakeVerifier::trusting(),
            steam(200, Arc::default()),
            |authenticated: Authenticated| async move {
                match authenticated.steam_id.as_u64() {
                    STEAM_ID => Outcome::<(), Banned>::Error(Banned),
                    _ => Outcome::Failure(Failure::new("unknown user")),
                }
            },
        )
        .unwrap();

        let outcome = strategy.authenticate(&callback_query(STEAM_ID)).await;
        assert!(matches!(outcome, Outcome::Error(AuthError::Validate(Banned))));

        let outcome = strategy.authenticate(&callback_query(76561197960287930)).await;
        assert!(matches!(
            outcome,
            Outcome::Failure(ref failure) if failure.message() == "unknown user",
        ));
    }

    #[tokio::test]
    async fn concurrent_attempts_are_independent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy = Strategy::with_verifier(
            options(),
            FakeVerifier::trusting(),
            steam(200, Arc::clone(&calls)),
            accept,
        )
        .unwrap();

        let first = callback_query(76561198282622073);
        let second = callback_query(76561197960287930);

        let (first, second) =
            tokio::join!(strategy.authenticate(&first), strategy.authenticate(&second));

        let (Outcome::Success(first), Outcome::Success(second)) = (first, second) else {
            panic!("expected both attempts to succeed");
        };

        assert_eq!(first.steam_id, 76561198282622073_u64);
        assert_eq!(first.profile.id, 76561198282622073_u64);
        assert_eq!(second.steam_id, 76561197960287930_u64);
        assert_eq!(second.profile.id, 76561197960287930_u64);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn authorization_url_points_at_steam() {
        let strategy = Strategy::with_verifier(
            options(),
            FakeVerifier::trusting(),
            steam(200, Arc::default()),
            accept,
        )
        .unwrap();

        let url = strategy.authorization_url().unwrap();
        let query = url.query_pairs().into_owned().collect::<HashMap<_, _>>();

        assert_eq!(strategy.name(), "steam");
        assert!(url.as_str().starts_with(LOGIN_URL));
        assert_eq!(query["openid.return_to"], "http://localhost:3000/auth/steam/return");
        assert_eq!(query["openid.realm"], "http://localhost:3000/");
    }
}
