use serde::{Deserialize, Serialize};

/// Payload sent by Steam after the login process is complete.
///
/// Everything except `openid.mode` is optional: a cancelled login only carries the mode, and
/// missing fields are rejected by whoever inspects them rather than at parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackPayload {
    #[serde(rename = "openid.ns", skip_serializing_if = "Option::is_none")]
    pub ns: Option<String>,

    #[serde(rename = "openid.mode")]
    pub mode: String,

    #[serde(rename = "openid.op_endpoint", skip_serializing_if = "Option::is_none")]
    pub op_endpoint: Option<String>,

    #[serde(rename = "openid.claimed_id", skip_serializing_if = "Option::is_none")]
    pub claimed_id: Option<String>,

    #[serde(rename = "openid.identity", skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,

    #[serde(rename = "openid.return_to", skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,

    #[serde(rename = "openid.response_nonce", skip_serializing_if = "Option::is_none")]
    pub response_nonce: Option<String>,

    #[serde(rename = "openid.invalidate_handle", skip_serializing_if = "Option::is_none")]
    pub invalidate_handle: Option<String>,

    #[serde(rename = "openid.assoc_handle", skip_serializing_if = "Option::is_none")]
    pub assoc_handle: Option<String>,

    #[serde(rename = "openid.signed", skip_serializing_if = "Option::is_none")]
    pub signed: Option<String>,

    #[serde(rename = "openid.sig", skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
}

impl CallbackPayload {
    /// Parses the query string of the request Steam redirected the user with.
    ///
    /// Unrelated query parameters are ignored.
    pub fn from_query(query: &str) -> Result<Self, serde_urlencoded::de::Error> {
        serde_urlencoded::from_str(query)
    }

    /// Whether the user aborted the login on Steam's side.
    pub fn is_cancel(&self) -> bool {
        self.mode == "cancel"
    }

    /// Encodes this payload as the form body of a `check_authentication` request.
    pub fn check_authentication_form(&self) -> Result<String, serde_urlencoded::ser::Error> {
        let mut payload = self.clone();
        payload.mode.clear();
        payload.mode.push_str("check_authentication");

        serde_urlencoded::to_string(&payload)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const QUERY: &str = "openid.ns=http%3A%2F%2Fspecs.openid.net%2Fauth%2F2.0\
        &openid.mode=id_res\
        &openid.op_endpoint=https%3A%2F%2Fsteamcommunity.com%2Fopenid%2Flogin\
        &openid.claimed_id=https%3A%2F%2Fsteamcommunity.com%2Fopenid%2Fid%2F76561198282622073\
        &openid.identity=https%3A%2F%2Fsteamcommunity.com%2Fopenid%2Fid%2F76561198282622073\
        &openid.return_to=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fsteam%2Freturn\
        &openid.response_nonce=2024-06-15T00%3A36%3A00Z7nVIS5lDAcZe%2FT0gT4%2BQNQyexyA%3D\
        &openid.assoc_handle=1234567890\
        &openid.signed=signed%2Cop_endpoint%2Cclaimed_id%2Cidentity%2Creturn_to%2Cresponse_nonce%2Cassoc_handle\
        &openid.sig=BK0zC%2F%2FKzERs7N%2BNlDO0aL06%2BBA%3D";

    #[test]
    fn parses_steam_redirect() {
        let payload = CallbackPayload::from_query(QUERY).unwrap();

        assert_eq!(payload.mode, "id_res");
        assert_eq!(payload.ns.as_deref(), Some("http://specs.openid.net/auth/2.0"));
        assert_eq!(
            payload.claimed_id.as_deref(),
            Some("https://steamcommunity.com/openid/id/76561198282622073"),
        );
        assert_eq!(payload.invalidate_handle, None);
        assert!(!payload.is_cancel());
    }

    #[test]
    fn parses_cancel() {
        let payload = CallbackPayload::from_query("openid.mode=cancel&foo=bar").unwrap();

        assert!(payload.is_cancel());
        assert_eq!(payload.claimed_id, None);
    }

    #[test]
    fn missing_mode_is_an_error() {
        assert!(CallbackPayload::from_query("openid.ns=foo").is_err());
    }

    #[test]
    fn check_authentication_form_replaces_mode() {
        let payload = CallbackPayload::from_query(QUERY).unwrap();
        let form = payload.check_authentication_form().unwrap();
        let reparsed = CallbackPayload::from_query(&form).unwrap();

        assert_eq!(reparsed.mode, "check_authentication");
        assert_eq!(reparsed.sig, payload.sig);
        assert_eq!(reparsed.signed, payload.signed);
        assert!(!form.contains("invalidate_handle"));
        assert_eq!(payload.mode, "id_res", "original payload should be untouched");
    }
}
