//! # ArcGIS REST client
//!
//! Sends requests to ArcGIS Portal, ArcGIS Server and GeoEvent Server
//! REST and admin endpoints, transparently handling tokens (including
//! federated servers), URL derivation and ArcGIS error reporting.
//!
//! Modules:
//! - `config`: connection settings and the YAML client file
//! - `endpoints`: endpoint kinds and URL derivation
//! - `cache`: token cache with expiry-aware lookup
//! - `sources`: token acquisition (generate, federation exchange, GeoEvent delegation)
//! - `parser`: classification of ArcGIS JSON responses
//! - `connection`: request dispatch and sessions

pub mod cache;
pub mod client;
pub mod config;
pub mod connection;
pub mod endpoints;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod parser;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::{token::TokenEntry, token_cache::TokenCache};
pub use crate::client::ArcgisRest;
pub use crate::config::service::{ServiceConfig, WebAdaptors};
pub use crate::connection::{Connection, Dispatch, RequestBody, RequestOutcome, Session};
pub use crate::endpoints::kind::EndpointKind;
pub use crate::error::{ArcgisError, Result};
