use serde::Serialize;
use url::Url;

use crate::{LOGIN_URL, OPENID_NS};

/// Value for `openid.identity` / `openid.claimed_id` that lets the provider pick the identity.
const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";

/// Constructs a URL for OpenID 2.0 login with Steam.
///
/// Steam will redirect the user to `return_to` after the login process is complete. `realm` is
/// the trust root shown to the user on Steam's login page; `return_to` must lie underneath it.
#[tracing::instrument(
    level = "trace",
    skip_all,
    fields(return_to = return_to.as_str(), realm = realm.as_str()),
    ret(Display, level = "debug"),
    err(level = "debug"),
)]
pub fn login_url(return_to: &Url, realm: &Url) -> Result<Url, serde_urlencoded::ser::Error> {
    let query_string = serde_urlencoded::to_string(&LoginForm {
        ns: OPENID_NS,
        mode: "checkid_setup",
        identity: IDENTIFIER_SELECT,
        claimed_id: IDENTIFIER_SELECT,
        realm: realm.as_str(),
        return_to: return_to.as_str(),
    })?;

    let mut url = Url::parse(LOGIN_URL).expect("hard-coded URL should be valid");
    url.set_query(Some(&query_string));

    Ok(url)
}

#[derive(Serialize)]
struct LoginForm<'a> {
    #[serde(rename = "openid.ns")]
    ns: &'static str,

    #[serde(rename = "openid.mode")]
    mode: &'static str,

    #[serde(rename = "openid.identity")]
    identity: &'static str,

    #[serde(rename = "openid.claimed_id")]
    claimed_id: &'static str,

    #[serde(rename = "openid.realm")]
    realm: &'a str,

    #[serde(rename = "openid.return_to")]
    return_to: &'a str,
}
