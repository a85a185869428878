use serde::Deserialize;

/// Token as returned by `generateToken`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    /// Expiry, milliseconds since the UNIX epoch.
    pub expires: i64,
    /// Whether the token must be used over HTTPS.
    #[serde(default)]
    pub ssl: bool,
}

impl TokenEntry {
    pub fn new(token: impl Into<String>, expires: i64, ssl: bool) -> Self {
        Self { token: token.into(), expires, ssl }
    }

    /// Live when it expires strictly after `now_ms + margin_ms`.
    pub fn is_live_at(&self, now_ms: i64, margin_ms: i64) -> bool {
        self.expires > now_ms + margin_ms
    }
}
