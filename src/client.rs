use std::sync::Arc;

use crate::cache::token_cache::TokenCache;
use crate::config::service::ServiceConfig;
use crate::connection::Connection;
use crate::endpoints::kind::EndpointKind;

/// State shared by every connection of one client.
#[derive(Debug)]
pub(crate) struct ClientContext {
    pub(crate) config: ServiceConfig,
    pub(crate) cache: TokenCache,
}

/// Handles connections and requests to the ArcGIS Enterprise endpoints of
/// one deployment.
#[derive(Debug, Clone)]
pub struct ArcgisRest {
    context: Arc<ClientContext>,
}

impl ArcgisRest {
    /// Client with its own token cache.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_cache(config, TokenCache::new())
    }

    /// Client sharing `cache` with other clients, e.g. for several
    /// deployments federated with the same portal.
    pub fn with_cache(config: ServiceConfig, cache: TokenCache) -> Self {
        Self {
            context: Arc::new(ClientContext { config, cache }),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.context.config
    }

    pub fn cache(&self) -> &TokenCache {
        &self.context.cache
    }

    pub fn connection(&self, kind: EndpointKind) -> Connection {
        Connection::new(kind, self.context.clone())
    }

    pub fn portal(&self) -> Connection {
        self.connection(EndpointKind::Portal)
    }

    pub fn arcgis(&self) -> Connection {
        self.connection(EndpointKind::Arcgis)
    }

    pub fn geoevent(&self) -> Connection {
        self.connection(EndpointKind::Geoevent)
    }
}
