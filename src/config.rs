use std::time::Duration;

use reqwest::Url;

use crate::error::{FritzError, Result};

pub const DEFAULT_HOST: &str = "fritz.box";

/// Sessions are dropped by the fritz box after 60 minutes of inactivity. We
/// refresh a bit earlier.
pub const MAX_SESSION_AGE_SECS: i64 = 59 * 60 + 50;

/// Connection settings for one fritz box.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Host name (`fritz.box`, `192.168.178.1`) or a full base url
    /// (`http://fritz.box:8080`).
    pub host: String,
    /// Request timeout. `None` uses the default of the http client.
    pub timeout: Option<Duration>,
    pub max_session_age: chrono::Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            timeout: None,
            max_session_age: chrono::Duration::seconds(MAX_SESSION_AGE_SECS),
        }
    }
}

impl ClientConfig {
    pub fn with_host(host: impl ToString) -> Self {
        Self {
            host: host.to_string(),
            ..Default::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> Result<Url> {
        let host = self.host.trim();
        let url = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };
        let url = Url::parse(&url).map_err(|err| FritzError::InvalidUrl(format!("{url}: {err}")))?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(FritzError::InvalidUrl(url.to_string()));
        }
        Ok(url)
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl ToString, password: impl ToString) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
