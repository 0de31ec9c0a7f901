//! In-memory login sessions.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use axum::extract::{FromRef, OptionalFromRequestParts};
use axum_extra::extract::cookie::CookieJar;
use steam_auth::{Authenticated, Outcome, Profile, SteamId, Validate};
use tokio::time::Instant;
use uuid::Uuid;

pub const COOKIE_NAME: &str = "signon-session";

/// A signed-in user, as stored in the session.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The verified OpenID identifier.
    pub identifier: String,

    /// The SteamID extracted from `identifier`.
    pub steam_id: SteamId,

    #[serde(flatten)]
    pub profile: Profile,
}

impl User {
    /// The Steam display name, or the identifier if no profile was fetched.
    pub fn name(&self) -> &str {
        self.profile
            .display_name
            .as_deref()
            .unwrap_or(&self.identifier)
    }

    /// The medium-sized avatar if Steam returned one, otherwise the first available.
    pub fn avatar_url(&self) -> Option<&str> {
        let photos = self.profile.photos.as_ref()?;

        photos
            .get(1)
            .or_else(|| photos.first())
            .map(|photo| photo.value.as_str())
    }

    pub fn legacy_id(&self) -> String {
        self.steam_id.as_legacy().to_string()
    }
}

/// Stores every authenticated Steam user as-is.
#[derive(Debug, Clone, Copy)]
pub struct IntoSessionUser;

impl Validate for IntoSessionUser {
    type User = User;
    type Error = Infallible;

    async fn validate(&self, authenticated: Authenticated) -> Outcome<User, Infallible> {
        Outcome::Success(User {
            identifier: authenticated.identifier,
            steam_id: authenticated.steam_id,
            profile: authenticated.profile,
        })
    }
}

/// Sessions expire after the same duration as their cookie.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, StoredSession>>>,
    ttl: Duration,
}

#[derive(Debug)]
struct StoredSession {
    user: User,
    expires_at: Instant,
}

impl StoredSession {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self { sessions: Arc::default(), ttl }
    }

    /// Starts a new session for `user` and returns its ID.
    ///
    /// Expired sessions are dropped along the way.
    pub fn login(&self, user: User) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        sessions.retain(|_, session| !session.is_expired(now));
        sessions.insert(id, StoredSession { user, expires_at: now + self.ttl });

        id
    }

    /// Ends the session with the given ID, if it exists.
    pub fn logout(&self, id: Uuid) -> Option<User> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|session| session.user)
    }

    /// Returns the user of a live session. An expired session is removed instead.
    pub fn get(&self, id: Uuid) -> Option<User> {
        let now = Instant::now();

        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);

            match sessions.get(&id) {
                None => return None,
                Some(session) if !session.is_expired(now) => return Some(session.user.clone()),
                Some(_) => {},
            }
        }

        tracing::debug!(%id, "session expired");

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);

        None
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// The session belonging to the current request.
///
/// Extracting `Option<Session>` never fails. Requests without a valid session cookie extract as
/// `None`.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    user: User,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}

impl<S> OptionalFromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionStore: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(cookie) = CookieJar::from_headers(&parts.headers).get(COOKIE_NAME).cloned() else {
            return Ok(None);
        };

        let Ok(id) = cookie.value().parse::<Uuid>() else {
            tracing::debug!(value = cookie.value(), "malformed session cookie");
            return Ok(None);
        };

        Ok(SessionStore::from_ref(state)
            .get(id)
            .map(|user| Session { id, user }))
    }
}
