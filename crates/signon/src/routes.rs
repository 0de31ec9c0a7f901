use std::sync::Arc;

use axum::Router;
use axum::extract::{FromRef, RawQuery, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing;
use axum_extra::extract::cookie::CookieJar;
use steam_auth::{Outcome, StatelessVerifier, Strategy};

use crate::config::CookieConfig;
use crate::http_client::HttpService;
use crate::response::ErrorResponse;
use crate::session::{self, IntoSessionUser, Session, SessionStore};
use crate::views::{self, AccountTemplate, IndexTemplate};

pub type SteamStrategy = Strategy<IntoSessionUser, StatelessVerifier<HttpService>, HttpService>;

#[derive(Debug, Clone, FromRef)]
pub struct AppState {
    strategy: SteamStrategy,
    sessions: SessionStore,
    cookie_config: Arc<CookieConfig>,
}

impl AppState {
    pub fn new(
        strategy: SteamStrategy,
        sessions: SessionStore,
        cookie_config: impl Into<Arc<CookieConfig>>,
    ) -> Self {
        Self { strategy, sessions, cookie_config: cookie_config.into() }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", routing::get(index))
        .route("/account", routing::get(account))
        .route("/logout", routing::get(logout))
        .route("/auth/steam", routing::get(login))
        .route("/auth/steam/return", routing::get(steam_callback))
        .with_state(state)
}

#[tracing::instrument(skip_all)]
async fn index(session: Option<Session>) -> Result<Html<String>, ErrorResponse> {
    views::render(&IndexTemplate { user: session.as_ref().map(Session::user) })
}

/// Only available to signed-in users; everyone else is sent back to `/`.
#[tracing::instrument(skip_all)]
async fn account(session: Option<Session>) -> Result<Response, ErrorResponse> {
    let Some(session) = session else {
        return Ok(Redirect::to("/").into_response());
    };

    let user_json = serde_json::to_string_pretty(session.user())
        .map_err(ErrorResponse::internal_server_error)?;

    views::render(&AccountTemplate { user: session.user(), user_json })
        .map(IntoResponse::into_response)
}

#[tracing::instrument(skip_all, fields(session.id = tracing::field::Empty))]
async fn logout(
    State(sessions): State<SessionStore>,
    State(cookie_config): State<Arc<CookieConfig>>,
    session: Option<Session>,
) -> (CookieJar, Redirect) {
    if let Some(session) = session {
        tracing::Span::current().record("session.id", tracing::field::display(session.id()));
        sessions.logout(session.id());
        tracing::info!("user logged out");
    }

    let session_cookie = cookie_config
        .build_cookie(session::COOKIE_NAME, "")
        .removal()
        .build();

    (CookieJar::new().add(session_cookie), Redirect::to("/"))
}

/// Redirects to Steam's login page.
#[tracing::instrument(skip_all, ret(level = "debug"))]
async fn login(State(strategy): State<SteamStrategy>) -> Result<Redirect, ErrorResponse> {
    strategy
        .authorization_url()
        .map(|url| Redirect::to(url.as_str()))
        .map_err(ErrorResponse::internal_server_error)
}

/// Steam sends users back here after they logged in.
#[tracing::instrument(skip_all, fields(session.id = tracing::field::Empty))]
async fn steam_callback(
    State(strategy): State<SteamStrategy>,
    State(sessions): State<SessionStore>,
    State(cookie_config): State<Arc<CookieConfig>>,
    RawQuery(query): RawQuery,
) -> Result<(CookieJar, Redirect), ErrorResponse> {
    match strategy
        .authenticate(query.as_deref().unwrap_or_default())
        .await
    {
        Outcome::Success(user) => {
            let steam_id = user.steam_id;
            let session_id = sessions.login(user);

            tracing::Span::current().record("session.id", tracing::field::display(session_id));
            tracing::info!(%steam_id, "user logged in");

            let session_cookie = cookie_config
                .build_cookie(session::COOKIE_NAME, session_id.to_string())
                .build();

            Ok((CookieJar::new().add(session_cookie), Redirect::to("/")))
        },
        Outcome::Failure(failure) => {
            tracing::info!(reason = %failure, "login failed");
            Ok((CookieJar::new(), Redirect::to("/")))
        },
        Outcome::Error(error) if error.is_upstream() => Err(ErrorResponse::bad_gateway(error)),
        Outcome::Error(error) => Err(ErrorResponse::internal_server_error(error)),
    }
}
