use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::endpoints::kind::EndpointKind;
use crate::error::{ArcgisError, Result};

pub const DEFAULT_TIMEOUT_MS: u64 = 4000;

/// ================================
/// Connection settings for one ArcGIS Enterprise deployment
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Host (and optional port) of the server, without scheme or directories.
    pub host: String,
    #[serde(default = "default_true")]
    pub https: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub web_adaptors: WebAdaptors,
    /// Public host used by the servers (the `WebContextURL` host), sent as the
    /// `Host` header when reading server info over a direct connection.
    pub public_host: Option<String>,
    /// Verify certificates and refuse to send credentials over plain HTTP.
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Web adaptor (reverse proxy) directory names. GeoEvent is never proxied.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct WebAdaptors {
    pub portal: Option<String>,
    #[serde(alias = "server")]
    pub arcgis: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl ServiceConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            https: true,
            username: None,
            password: None,
            web_adaptors: WebAdaptors::default(),
            public_host: None,
            verify_ssl: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Build from a server URL such as `https://example.com` or `http://example.com:6080`.
    pub fn from_server_url(server: &str) -> Result<Self> {
        let parsed = Url::parse(server).map_err(|err| ArcgisError::malformed_url(server, err.to_string()))?;
        let host = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ArcgisError::malformed_url(server, "missing its domain"))?;
        let host = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_owned(),
        };

        Ok(Self::new(host).with_https(parsed.scheme().eq_ignore_ascii_case("https")))
    }

    pub fn with_https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_web_adaptors(mut self, web_adaptors: WebAdaptors) -> Self {
        self.web_adaptors = web_adaptors;
        self
    }

    pub fn with_public_host(mut self, public_host: impl Into<String>) -> Self {
        self.public_host = Some(public_host.into());
        self
    }

    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Both parts set and non-empty, otherwise requests go out unauthenticated.
    pub fn credentials(&self) -> Option<Credentials<'_>> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Credentials { username, password })
            }
            _ => None,
        }
    }

    /// Web adaptor directory for `kind`; `None` means a direct connection.
    pub fn web_adaptor(&self, kind: EndpointKind) -> Option<&str> {
        match kind {
            EndpointKind::Portal => self.web_adaptors.portal.as_deref(),
            EndpointKind::Arcgis => self.web_adaptors.arcgis.as_deref(),
            EndpointKind::Geoevent => None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
