use crate::error::{Error, Result};
use base64::Engine;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "https://www.polaraccesslink.com";
pub const DEFAULT_TOKEN_URL: &str = "https://polarremote.com/v2/oauth2/token";
pub const DEFAULT_AUTHORIZATION_URL: &str = "https://flow.polar.com/oauth2/authorization";
pub const DEFAULT_TIMEOUT_SECS: u16 = 30;

/// Settings for one AccessLink client registration.
///
/// Built once, then shared read-only by every client cloned from it.
#[derive(Clone)]
pub struct Config {
    host: String,
    client_id: String,
    client_secret: String,
    timeout: u16,
    limit_rate: u8,
    strict_status: bool,
    token_url: String,
    authorization_url: String,
    basic_token: OnceLock<String>,
}

impl Config {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
            limit_rate: 0,
            strict_status: false,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            authorization_url: DEFAULT_AUTHORIZATION_URL.to_string(),
            basic_token: OnceLock::new(),
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let client_id = required("POLAR_CLIENT_ID")?;
        let client_secret = required("POLAR_CLIENT_SECRET")?;

        Ok(Self::new(client_id, client_secret)
            .with_host(std::env::var("POLAR_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()))
            .with_timeout(parsed("POLAR_TIMEOUT", DEFAULT_TIMEOUT_SECS)?)
            .with_limit_rate(parsed("POLAR_LIMIT_RATE", 0)?)
            .with_strict_status(parsed("POLAR_STRICT_STATUS", false)?)
            .with_token_url(
                std::env::var("POLAR_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            )
            .with_authorization_url(
                std::env::var("POLAR_AUTHORIZATION_URL")
                    .unwrap_or_else(|_| DEFAULT_AUTHORIZATION_URL.to_string()),
            ))
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Request timeout in seconds; 0 disables it.
    pub fn with_timeout(mut self, seconds: u16) -> Self {
        self.timeout = seconds;
        self
    }

    /// Accepted for compatibility with existing deployments. Requests are not throttled.
    pub fn with_limit_rate(mut self, limit_rate: u8) -> Self {
        self.limit_rate = limit_rate;
        self
    }

    /// Turn non-success statuses into `Error::UnexpectedStatus` instead of empty results.
    pub fn with_strict_status(mut self, strict: bool) -> Self {
        self.strict_status = strict;
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_authorization_url(mut self, url: impl Into<String>) -> Self {
        self.authorization_url = url.into();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(u64::from(self.timeout)))
    }

    pub fn limit_rate(&self) -> u8 {
        self.limit_rate
    }

    pub fn strict_status(&self) -> bool {
        self.strict_status
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn authorization_url(&self) -> &str {
        &self.authorization_url
    }

    /// `Basic base64(client_id:client_secret)`, computed on first use.
    pub fn basic_authorization(&self) -> &str {
        self.basic_token.get_or_init(|| {
            let credentials = format!("{}:{}", self.client_id, self.client_secret);
            format!(
                "Basic {}",
                base64::engine::general_purpose::STANDARD.encode(credentials)
            )
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("limit_rate", &self.limit_rate)
            .field("strict_status", &self.strict_status)
            .field("token_url", &self.token_url)
            .field("authorization_url", &self.authorization_url)
            .finish()
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| Error::Config(format!("{} is not set", key)))
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid {}: {}", key, raw))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_authorization_is_base64_of_credentials() {
        let config = Config::new("id", "secret");
        // base64("id:secret")
        assert_eq!(config.basic_authorization(), "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn basic_authorization_is_memoized() {
        let config = Config::new("client", "s3cr3t");
        let first = config.basic_authorization();
        let second = config.basic_authorization();
        assert_eq!(first, second);
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn host_trailing_slash_is_trimmed() {
        let config = Config::new("id", "secret").with_host("http://localhost:9000/");
        assert_eq!(config.host(), "http://localhost:9000");
    }

    #[test]
    fn zero_timeout_disables_it() {
        assert_eq!(Config::new("a", "b").with_timeout(0).timeout(), None);
        assert_eq!(
            Config::new("a", "b").timeout(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", Config::new("id", "topsecret"));
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("<redacted>"));
    }
}
