use std::fmt;
use std::time::Duration;

use url::Url;

/// Configuration for a [`Strategy`](crate::Strategy).
#[derive(Clone)]
pub struct StrategyOptions {
    /// The URL Steam redirects users back to after they logged in.
    pub return_url: Url,

    /// The OpenID realm (trust root). `return_url` must lie underneath it.
    pub realm: Url,

    /// Steam Web API key, used for fetching profiles.
    pub api_key: String,

    /// Whether to fetch the user's public profile after a successful login.
    pub profile: bool,

    /// Upper bound for every outbound request made during a single login attempt.
    pub request_timeout: Duration,
}

impl fmt::Debug for StrategyOptions {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("StrategyOptions")
            .field("return_url", &format_args!("{:?}", self.return_url.as_str()))
            .field("realm", &format_args!("{:?}", self.realm.as_str()))
            .field("api_key", &"*****")
            .field("profile", &self.profile)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl StrategyOptions {
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates options with profile fetching enabled and the default request timeout.
    pub fn new(return_url: Url, realm: Url, api_key: impl Into<String>) -> Self {
        Self {
            return_url,
            realm,
            api_key: api_key.into(),
            profile: true,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_profile(self, profile: bool) -> Self {
        Self { profile, ..self }
    }

    pub fn with_request_timeout(self, request_timeout: Duration) -> Self {
        Self { request_timeout, ..self }
    }

    /// Checks the options for consistency.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let same_origin = self.return_url.origin() == self.realm.origin();

        if !same_origin || !self.return_url.path().starts_with(self.realm.path()) {
            return Err(OptionsError::ReturnUrlOutsideRealm {
                return_url: self.return_url.clone(),
                realm: self.realm.clone(),
            });
        }

        if self.profile && self.api_key.is_empty() {
            return Err(OptionsError::MissingApiKey);
        }

        Ok(())
    }
}

#[derive(Debug, Display, Error)]
pub enum OptionsError {
    #[display("return URL `{return_url}` is not underneath realm `{realm}`")]
    ReturnUrlOutsideRealm { return_url: Url, realm: Url },

    #[display("fetching profiles requires a Steam Web API key")]
    MissingApiKey,
}
