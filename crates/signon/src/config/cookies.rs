use std::borrow::Cow;

use cookie::time::Duration;
use cookie::{Cookie, CookieBuilder, SameSite};

#[derive(Debug, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CookieConfig {
    /// The [`Domain`] field. Omitted if unset, which restricts cookies to the exact host.
    ///
    /// [`Domain`]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Set-Cookie#domaindomain-value
    pub domain: Option<String>,

    /// The [`Max-Age`] field (in seconds).
    ///
    /// [`Max-Age`]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Set-Cookie#max-agenumber
    #[serde(default = "default_max_age", deserialize_with = "deserialize_max_age")]
    pub max_age: Duration,

    /// Whether cookies should only be sent over HTTPS.
    pub secure: bool,
}

impl CookieConfig {
    /// How long a server-side session lives; matches the cookie's `Max-Age`.
    pub fn session_ttl(&self) -> std::time::Duration {
        self.max_age.unsigned_abs()
    }

    /// Starts building an http-only cookie with the configured defaults.
    pub fn build_cookie<'a>(
        &self,
        name: impl Into<Cow<'a, str>>,
        value: impl Into<Cow<'a, str>>,
    ) -> CookieBuilder<'a> {
        let builder = Cookie::build((name, value))
            .http_only(true)
            .max_age(self.max_age)
            .path("/")
            // Steam redirects back to us cross-site, so `Strict` would drop the cookie.
            .same_site(SameSite::Lax)
            .secure(self.secure);

        match self.domain {
            Some(ref domain) => builder.domain(domain.clone()),
            None => builder,
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self { domain: None, max_age: default_max_age(), secure: false }
    }
}

fn default_max_age() -> Duration {
    Duration::days(1)
}

fn deserialize_max_age<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <i64 as serde::Deserialize<'de>>::deserialize(deserializer).map(Duration::seconds)
}
