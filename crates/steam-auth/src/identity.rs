//! Checks that an OpenID assertion actually talks about a Steam account.
//!
//! Verifying the assertion with Steam only proves that *some* OpenID provider issued it. Whoever
//! sent the callback controls every query parameter, so we additionally pin the endpoint, the
//! namespace, and the shape of every identity URL to Steam's.

use steam_id::SteamId;
use steam_openid::{CallbackPayload, IDENTITY_URL_PREFIX, LOGIN_URL, OPENID_NS};

use crate::Failure;

/// The claimed identity did not pass the Steam checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Claimed identity is invalid.")]
pub struct IdentityRejected;

impl From<IdentityRejected> for Failure {
    fn from(_: IdentityRejected) -> Self {
        Failure::INVALID_IDENTITY
    }
}

/// Validates `identifier` (the verified claimed identifier) together with the raw `payload` it
/// came from, and extracts the account's [`SteamId`].
///
/// Passes only if
///   - `openid.op_endpoint` is Steam's login endpoint
///   - `identifier` is `http(s)://steamcommunity.com/openid/id/<digits>` and nothing else
///   - `openid.ns` is the OpenID 2.0 namespace
///   - `openid.claimed_id` and `openid.identity` both point at Steam identity URLs
///
/// A digit run that does not fit into 64 bits is rejected as well.
pub fn verify_identity(
    payload: &CallbackPayload,
    identifier: &str,
) -> Result<SteamId, IdentityRejected> {
    if payload.op_endpoint.as_deref() != Some(LOGIN_URL) {
        tracing::debug!(op_endpoint = payload.op_endpoint.as_deref(), "unexpected op_endpoint");
        return Err(IdentityRejected);
    }

    let Some(digits) = identifier_digits(identifier) else {
        tracing::debug!(identifier, "identifier is not a Steam identity URL");
        return Err(IdentityRejected);
    };

    if payload.ns.as_deref() != Some(OPENID_NS) {
        tracing::debug!(ns = payload.ns.as_deref(), "unexpected namespace");
        return Err(IdentityRejected);
    }

    let is_steam_identity =
        |url: Option<&str>| url.is_some_and(|url| url.starts_with(IDENTITY_URL_PREFIX));

    if !is_steam_identity(payload.claimed_id.as_deref())
        || !is_steam_identity(payload.identity.as_deref())
    {
        tracing::debug!(
            claimed_id = payload.claimed_id.as_deref(),
            identity = payload.identity.as_deref(),
            "claimed identity is not a Steam identity URL",
        );
        return Err(IdentityRejected);
    }

    SteamId::parse_u64(digits).map_err(|error| {
        tracing::debug!(digits, %error, "identifier is not a valid SteamID");
        IdentityRejected
    })
}

/// Returns the trailing digits of `http(s)://steamcommunity.com/openid/id/<digits>`.
fn identifier_digits(identifier: &str) -> Option<&str> {
    let rest = identifier
        .strip_prefix("https://")
        .or_else(|| identifier.strip_prefix("http://"))?;

    let digits = rest.strip_prefix("steamcommunity.com/openid/id/")?;

    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    Some(digits)
}
