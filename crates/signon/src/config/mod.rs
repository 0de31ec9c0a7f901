//! Configuration for the `signon` binary.
//!
//! Everything is read from a single TOML file; every section and every field is optional.

mod server;
pub use server::ServerConfig;

pub mod tracing;
pub use tracing::TracingConfig;

mod runtime;
pub use runtime::RuntimeConfig;

mod cookies;
pub use cookies::CookieConfig;

mod steam_auth;
pub use steam_auth::SteamAuthConfig;

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Configuration for the HTTP server.
    pub server: ServerConfig,

    /// Configuration for [`tracing-subscriber`].
    pub tracing: TracingConfig,

    /// Configuration for Tokio.
    pub runtime: RuntimeConfig,

    /// Fields of the session cookie.
    pub cookies: CookieConfig,

    pub steam_auth: SteamAuthConfig,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = toml::from_str::<Config>("").unwrap();

        assert_eq!(config.server.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(config.tracing.enable);
        assert!(config.tracing.stderr.enable);
        assert!(!config.tracing.files.enable);
        assert_eq!(config.runtime.worker_threads, None);
        assert_eq!(config.cookies.domain, None);
        assert_eq!(config.steam_auth.return_url.as_str(), "http://localhost:3000/auth/steam/return");
        assert_eq!(config.steam_auth.realm.as_str(), "http://localhost:3000/");
        assert!(config.steam_auth.profile);
        assert_eq!(config.steam_auth.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn parses_every_section() {
        let config = toml::from_str::<Config>(
            r#"
            [server]
            ip-addr = "0.0.0.0"
            port = 8080

            [tracing]
            enable = true
            stderr.enable = false
            files.enable = true
            files.directory = "/tmp/signon"

            [runtime]
            worker-threads = 2

            [cookies]
            domain = "example.org"
            max-age = 3600
            secure = true

            [steam-auth]
            return-url = "https://example.org/auth/steam/return"
            realm = "https://example.org/"
            api-key = "secret"
            profile = false
            request-timeout = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.server.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(!config.tracing.stderr.enable);
        assert_eq!(config.tracing.files.directory.to_str(), Some("/tmp/signon"));
        assert_eq!(config.runtime.worker_threads.map(|n| n.get()), Some(2));
        assert_eq!(config.cookies.domain.as_deref(), Some("example.org"));
        assert_eq!(config.cookies.max_age.whole_seconds(), 3600);
        assert!(config.cookies.secure);

        let options = config.steam_auth.strategy_options();

        assert_eq!(options.return_url.as_str(), "https://example.org/auth/steam/return");
        assert_eq!(options.api_key, "secret");
        assert!(!options.profile);
        assert_eq!(options.request_timeout, Duration::from_secs(3));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(toml::from_str::<Config>("[steam-auth]\nprovider-url = \"x\"").is_err());
        assert!(toml::from_str::<Config>("foo = 1").is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = toml::from_str::<Config>("[steam-auth]\napi-key = \"super-secret\"").unwrap();

        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
