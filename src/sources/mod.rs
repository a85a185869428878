//! Token sources
//!
//! Obtains tokens for the three endpoint kinds and keeps the token cache
//! populated. Portal and ArcGIS Server follow the standard info ->
//! generateToken flow (plus a token exchange for federated servers);
//! GeoEvent delegates to its companion ArcGIS Server.

pub mod generate;
pub mod server_info;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::cache::token::TokenEntry;
use crate::cache::token_cache::TokenCache;
use crate::config::service::{Credentials, ServiceConfig};
use crate::endpoints::kind::EndpointKind;
use crate::endpoints::url::{derive_companion_server_url, derive_referer_url};
use crate::error::{ArcgisError, Result};
use crate::observability::metrics::get_metrics;

use generate::{exchange_token, generate_token};
use server_info::fetch_server_info;

/// Issues tokens for request URLs, reusing cached tokens when live.
#[derive(Debug, Clone, Copy)]
pub struct TokenIssuer<'a> {
    http: &'a Client,
    cache: &'a TokenCache,
    config: &'a ServiceConfig,
}

impl<'a> TokenIssuer<'a> {
    pub fn new(http: &'a Client, cache: &'a TokenCache, config: &'a ServiceConfig) -> Self {
        Self { http, cache, config }
    }

    /// Token valid for `url` on a server of `kind`.
    pub fn get_token(&self, kind: EndpointKind, url: &str, credentials: Credentials<'_>) -> Result<TokenEntry> {
        match kind {
            EndpointKind::Portal | EndpointKind::Arcgis => self.standard_token(kind, url, credentials),
            EndpointKind::Geoevent => self.delegated_token(url, credentials),
        }
    }

    fn standard_token(&self, kind: EndpointKind, url: &str, credentials: Credentials<'_>) -> Result<TokenEntry> {
        if let Some(entry) = self.cache.get(url)? {
            debug!(url, "reusing stored token");
            return Ok(entry);
        }

        // Get the server information & validate it's data
        let info = fetch_server_info(self.http, kind, url, self.config.public_host.as_deref())?;
        if !info.is_token_based_security()? {
            return Err(ArcgisError::UnsupportedAuthScheme { url: url.to_owned() });
        }
        let token_url = info
            .token_services_url()?
            .ok_or_else(|| ArcgisError::MissingTokenService { url: url.to_owned() })?
            .to_owned();

        // A token from the same token service may already exist (e.g. the portal's)
        let mut entry = match self.cache.get(&token_url)? {
            Some(entry) => {
                debug!(token_url = %token_url, "reusing token of token service");
                entry
            }
            None => {
                let referer = derive_referer_url(url).ok();
                let entry = generate_token(self.http, &token_url, credentials, referer.as_deref(), self.config.verify_ssl)?;
                get_metrics().tokens_issued.with_label_values(&[kind.as_str(), "generate"]).inc();
                self.cache.put(&token_url, entry.clone())?;
                entry
            }
        };

        // Federated server: swap the portal token for a server token
        if kind == EndpointKind::Arcgis && info.is_federated() {
            info!(url, owning_system = ?info.owning_system_url(), "server is federated");
            entry = exchange_token(self.http, &token_url, url, &entry.token, self.config.verify_ssl)?;
            get_metrics().tokens_issued.with_label_values(&[kind.as_str(), "exchange"]).inc();
            self.cache.put(url, entry.clone())?;
        }

        Ok(entry)
    }

    /// GeoEvent accepts tokens of the ArcGIS Server on the same machine.
    fn delegated_token(&self, url: &str, credentials: Credentials<'_>) -> Result<TokenEntry> {
        if self.config.web_adaptor(EndpointKind::Arcgis).is_some() {
            return Err(ArcgisError::UnsupportedRouting {
                kind: EndpointKind::Geoevent.as_str(),
            });
        }

        let server_url = derive_companion_server_url(url)?;
        debug!(url, server_url = %server_url, "delegating GeoEvent token to ArcGIS Server");

        let entry = self.standard_token(EndpointKind::Arcgis, &server_url, credentials)?;
        get_metrics().tokens_issued.with_label_values(&[EndpointKind::Geoevent.as_str(), "delegate"]).inc();
        self.cache.put(url, entry.clone())?;
        Ok(entry)
    }
}
