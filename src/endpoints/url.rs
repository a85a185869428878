//! URL derivation for the three endpoint kinds.
//!
//! - `derive_base_url`: `scheme://host[:port]/root`, the token cache key
//! - `derive_referer_url`: `scheme://host[:port]`, the referer for tokens
//! - `assemble_url`: full request URL for a kind, connection mode and sub-path

use url::Url;

use crate::config::service::ServiceConfig;
use crate::endpoints::kind::EndpointKind;
use crate::error::{ArcgisError, Result};

/// Base URL of a server endpoint, e.g. `https://example.com:6443/arcgis`.
pub fn derive_base_url(url: &str) -> Result<String> {
    let parsed = parse_absolute(url)?;
    let root = parsed
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| ArcgisError::malformed_url(url, "must contain the endpoint root directory"))?
        .to_owned();

    Ok(format!("{}/{}", origin(&parsed), root))
}

/// Referer URL used when generating tokens, e.g. `https://example.com`.
pub fn derive_referer_url(url: &str) -> Result<String> {
    parse_absolute(url).map(|parsed| origin(&parsed))
}

/// Full URL to a resource: scheme, host (+ default port on direct
/// connections), root directory, rest/admin sub-path, then `path`.
pub fn assemble_url(kind: EndpointKind, config: &ServiceConfig, path: &str, admin: bool) -> String {
    let scheme = if config.https { "https" } else { "http" };
    let web_adaptor = config.web_adaptor(kind);

    let mut server = config.host.clone();
    if !server.contains(':') && web_adaptor.is_none() {
        server = format!("{}:{}", server, kind.default_port(config.https));
    }

    let directory = match web_adaptor {
        Some(adaptor) => with_leading_separator(adaptor),
        None => kind.properties().directory.to_owned(),
    };

    format!(
        "{}://{}{}{}{}",
        scheme,
        server,
        directory,
        kind.sub_path(admin),
        with_leading_separator(path)
    )
}

/// Companion ArcGIS Server URL of a GeoEvent URL: same scheme and host,
/// ArcGIS Server default port and root directory.
pub fn derive_companion_server_url(url: &str) -> Result<String> {
    let parsed = parse_absolute(url)?;
    let https = parsed.scheme().eq_ignore_ascii_case("https");
    let host = parsed.host_str().unwrap_or_default();
    let server = EndpointKind::Arcgis;

    Ok(format!(
        "{}://{}:{}{}",
        parsed.scheme(),
        host,
        server.default_port(https),
        server.properties().directory
    ))
}

pub(crate) fn is_https(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| parsed.scheme().eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

fn parse_absolute(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|err| ArcgisError::malformed_url(url, format!("missing either its scheme, domain, or path ({})", err)))?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(ArcgisError::malformed_url(url, "missing its domain")),
    }
}

fn origin(parsed: &Url) -> String {
    let host = parsed.host_str().unwrap_or_default();
    match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    }
}

fn with_leading_separator(segment: &str) -> String {
    format!("/{}", segment.trim_start_matches(['/', '\\']))
}
