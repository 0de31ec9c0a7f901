use std::time::Duration;

use steam_auth::StrategyOptions;
use url::Url;

#[derive(Debug, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SteamAuthConfig {
    /// Where Steam should send users after they logged in.
    #[debug("{:?}", return_url.as_str())]
    #[serde(default = "default_return_url")]
    pub return_url: Url,

    #[debug("{:?}", realm.as_str())]
    #[serde(default = "default_realm")]
    pub realm: Url,

    /// Steam Web API key. Can also be set with the `STEAM_API_KEY` environment variable.
    #[debug(skip)]
    pub api_key: String,

    /// Whether to fetch users' public profiles.
    #[serde(default = "default_profile")]
    pub profile: bool,

    /// Timeout for requests to Steam (in seconds).
    #[serde(default = "default_request_timeout", deserialize_with = "deserialize_seconds")]
    pub request_timeout: Duration,
}

impl SteamAuthConfig {
    pub fn strategy_options(&self) -> StrategyOptions {
        StrategyOptions::new(self.return_url.clone(), self.realm.clone(), self.api_key.as_str())
            .with_profile(self.profile)
            .with_request_timeout(self.request_timeout)
    }

    /// Replaces the configured API key with `api_key`, unless it is missing or empty.
    pub fn override_api_key(&mut self, api_key: Option<String>) {
        if let Some(api_key) = api_key.filter(|api_key| !api_key.is_empty()) {
            self.api_key = api_key;
        }
    }
}

impl Default for SteamAuthConfig {
    fn default() -> Self {
        Self {
            return_url: default_return_url(),
            realm: default_realm(),
            api_key: String::new(),
            profile: default_profile(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_return_url() -> Url {
    Url::parse("http://localhost:3000/auth/steam/return").expect("hard-coded URL should be valid")
}

fn default_realm() -> Url {
    Url::parse("http://localhost:3000/").expect("hard-coded URL should be valid")
}

fn default_profile() -> bool {
    true
}

fn default_request_timeout() -> Duration {
    StrategyOptions::DEFAULT_REQUEST_TIMEOUT
}

fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <u64 as serde::Deserialize<'de>>::deserialize(deserializer).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_override_keeps_configured_api_key() {
        let mut config = SteamAuthConfig { api_key: String::from("from-file"), ..Default::default() };

        config.override_api_key(Some(String::new()));
        assert_eq!(config.api_key, "from-file");

        config.override_api_key(None);
        assert_eq!(config.api_key, "from-file");

        config.override_api_key(Some(String::from("from-env")));
        assert_eq!(config.api_key, "from-env");
    }
}
