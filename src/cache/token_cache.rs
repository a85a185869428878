use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::cache::token::TokenEntry;
use crate::endpoints::url::derive_base_url;
use crate::error::Result;
use crate::helpers::time::now_ms;
use crate::observability::metrics::get_metrics;

/// Entries expiring within this window are treated as absent.
pub const EXPIRY_MARGIN_MS: i64 = 10 * 60 * 1000;

/// Token cache keyed by server base URL (`scheme://host[:port]/root`).
///
/// Clones share the same store. Overwrites are last-writer-wins.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<HashMap<String, TokenEntry>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token stored for the server of `url`, if it is valid for at least
    /// another ten minutes.
    pub fn get(&self, url: &str) -> Result<Option<TokenEntry>> {
        self.get_at(url, now_ms())
    }

    pub(crate) fn get_at(&self, url: &str, now_ms: i64) -> Result<Option<TokenEntry>> {
        let key = derive_base_url(url)?;
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let entry = map
            .get(&key)
            .filter(|entry| entry.is_live_at(now_ms, EXPIRY_MARGIN_MS))
            .cloned();

        let result = if entry.is_some() { "hit" } else { "miss" };
        get_metrics().token_cache_lookups.with_label_values(&[result]).inc();
        debug!(key = %key, result, "token cache lookup");

        Ok(entry)
    }

    /// Store or replace the token for the server of `url`.
    pub fn put(&self, url: &str, entry: TokenEntry) -> Result<()> {
        let key = derive_base_url(url)?;
        debug!(key = %key, expires = entry.expires, "token cache store");
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(key, entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
