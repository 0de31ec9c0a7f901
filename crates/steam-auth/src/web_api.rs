//! Fetching public profiles from the Steam Web API.

use std::sync::Arc;
use std::time::Duration;
use std::{fmt, str};

use bytes::Bytes;
use http_body::Body as HttpBody;
use serde::Deserialize;
use steam_id::SteamId;
use steam_openid::client::{self, BoxError, RequestError};
use tower::Service;
use url::Url;

use crate::{Photo, Profile};

/// Steam Web API URL for fetching user information.
pub const USER_URL: &str = "https://api.steampowered.com/ISteamUser/GetPlayerSummaries/v0002";

#[derive(Debug, Display, Error, From)]
pub enum ProfileError {
    #[display("failed to encode request query")]
    EncodeQuery(serde_urlencoded::ser::Error),

    #[display("failed to build request")]
    BuildRequest(http::Error),

    #[display("failed to make http request to Steam")]
    Request(RequestError),

    #[display("Steam returned a bad status code ({})", response.status())]
    #[from(ignore)]
    BadStatus { response: http::Response<Bytes> },

    #[display("failed to deserialize response from Steam")]
    #[from(ignore)]
    DeserializeResponse {
        #[error(source)]
        error: serde_json::Error,
        response: http::Response<Bytes>,
    },

    #[display("Steam returned no player for {steam_id}")]
    #[from(ignore)]
    MissingPlayer { steam_id: SteamId },

    #[display("Steam returned player {returned} when asked for {requested}")]
    #[from(ignore)]
    MismatchedPlayer { requested: SteamId, returned: SteamId },

    #[display("Steam returned an unusable player object for {steam_id}")]
    #[from(ignore)]
    InvalidPlayer {
        #[error(source)]
        error: serde_json::Error,
        steam_id: SteamId,
    },
}

/// Coarse classification of a [`ProfileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileErrorKind {
    /// We did not get a usable answer from Steam at all.
    Upstream,

    /// Steam answered, but the answer did not contain a usable player.
    Malformed,
}

impl ProfileError {
    pub const fn kind(&self) -> ProfileErrorKind {
        match self {
            Self::EncodeQuery(_)
            | Self::BuildRequest(_)
            | Self::Request(_)
            | Self::BadStatus { .. }
            | Self::DeserializeResponse { .. } => ProfileErrorKind::Upstream,
            Self::MissingPlayer { .. }
            | Self::MismatchedPlayer { .. }
            | Self::InvalidPlayer { .. } => ProfileErrorKind::Malformed,
        }
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(RequestError::Timeout(_)))
    }
}

/// Turns SteamIDs into [`Profile`]s.
#[derive(Clone)]
pub struct ProfileEnricher<S> {
    http_client: S,
    api_key: Arc<str>,
    api_url: Url,
    timeout: Duration,
}

impl<S> fmt::Debug for ProfileEnricher<S> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("ProfileEnricher")
            .field("api_url", &format_args!("{:?}", self.api_url.as_str()))
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<S> ProfileEnricher<S> {
    pub fn new(http_client: S, api_key: impl Into<Arc<str>>, timeout: Duration) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            api_url: USER_URL.parse().expect("hard-coded URL should be valid"),
            timeout,
        }
    }

    /// Overrides the `GetPlayerSummaries` endpoint.
    pub fn with_api_url(self, api_url: Url) -> Self {
        Self { api_url, ..self }
    }
}

impl<S, ResponseBody> ProfileEnricher<S>
where
    S: Service<http::Request<Bytes>, Response = http::Response<ResponseBody>>,
    S: Clone + Send + Sync,
    S::Error: Into<BoxError>,
    S::Future: Send,
    ResponseBody: HttpBody<Data: Send> + Send,
    ResponseBody::Error: Into<BoxError>,
{
    /// Produces a profile for `steam_id`.
    ///
    /// If `fetch` is `false`, no request is made and a [minimal profile](Profile::minimal) is
    /// returned.
    #[tracing::instrument(level = "debug", skip(self), err(level = "debug"))]
    pub async fn enrich(&self, steam_id: SteamId, fetch: bool) -> Result<Profile, ProfileError> {
        if !fetch {
            return Ok(Profile::minimal(steam_id));
        }

        self.fetch(steam_id).await
    }

    /// Fetches `steam_id`'s public profile with a single `GetPlayerSummaries` request.
    pub async fn fetch(&self, steam_id: SteamId) -> Result<Profile, ProfileError> {
        #[derive(serde::Serialize)]
        struct Query<'a> {
            #[serde(rename = "key")]
            api_key: &'a str,

            #[serde(rename = "steamids", serialize_with = "SteamId::serialize_u64")]
            steam_id: SteamId,
        }

        let query = serde_urlencoded::to_string(&Query { api_key: &self.api_key, steam_id })?;
        let mut url = self.api_url.clone();
        url.set_query(Some(&query));

        let request = http::Request::get(url.as_str()).body(Bytes::new())?;
        let response = client::send(self.http_client.clone(), request, self.timeout).await?;

        if !response.status().is_success() {
            if let Ok(body) = str::from_utf8(&response.body()[..]) {
                tracing::debug!(
                    body,
                    status = response.status().as_u16(),
                    "Steam returned bad status",
                );
            }

            return Err(ProfileError::BadStatus { response });
        }

        let players = match serde_json::from_slice::<ApiResponse>(&response.body()[..]) {
            Ok(ApiResponse { response: FetchPlayerResponse { players } }) => players,
            Err(error) => return Err(ProfileError::DeserializeResponse { error, response }),
        };

        let Some(raw) = players.into_iter().next() else {
            return Err(ProfileError::MissingPlayer { steam_id });
        };

        let player = PlayerObject::deserialize(&raw)
            .map_err(|error| ProfileError::InvalidPlayer { error, steam_id })?;

        if player.steamid != steam_id {
            return Err(ProfileError::MismatchedPlayer {
                requested: steam_id,
                returned: player.steamid,
            });
        }

        let photos = [player.avatar, player.avatarmedium, player.avatarfull]
            .into_iter()
            .flatten()
            .map(|value| Photo { value })
            .collect::<Vec<_>>();

        Ok(Profile {
            provider: Profile::PROVIDER.to_owned(),
            id: steam_id,
            sid: Some(steam_id.as_legacy()),
            display_name: player.personaname,
            photos: (!photos.is_empty()).then_some(photos),
            json: Some(raw),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    response: FetchPlayerResponse,
}

#[derive(Debug, Deserialize)]
struct FetchPlayerResponse {
    #[serde(default)]
    players: Vec<serde_json::Value>,
}

/// Only `steamid` is required; everything else is cosmetic and dropped if missing or unusable.
#[derive(Debug, Deserialize)]
struct PlayerObject {
    steamid: SteamId,

    #[serde(default)]
    personaname: Option<String>,

    #[serde(default, deserialize_with = "deserialize_lenient_url")]
    avatar: Option<Url>,

    #[serde(default, deserialize_with = "deserialize_lenient_url")]
    avatarmedium: Option<Url>,

    #[serde(default, deserialize_with = "deserialize_lenient_url")]
    avatarfull: Option<Url>,
}

fn deserialize_lenient_url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = <Option<serde_json::Value> as Deserialize<'de>>::deserialize(deserializer)?;

    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|url| Url::parse(url).ok()))
}
