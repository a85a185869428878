use reqwest::blocking::Client;
use reqwest::header::HOST;
use serde_json::{Map, Value};
use tracing::debug;

use crate::endpoints::kind::EndpointKind;
use crate::endpoints::url::derive_base_url;
use crate::error::{ArcgisError, Result};
use crate::parser::response::read_esri_json;

pub const ACTION_SERVER_INFO: &str = "getting ArcGIS Server info";

/// The `/rest/info` document of a portal or server.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    url: String,
    data: Map<String, Value>,
}

impl ServerInfo {
    pub fn from_value(url: &str, value: Value) -> Result<Self> {
        match value {
            Value::Object(data) => Ok(Self { url: url.to_owned(), data }),
            other => Err(ArcgisError::MalformedResponse {
                url: url.to_owned(),
                action: ACTION_SERVER_INFO.to_owned(),
                message: format!("expected a JSON object, got {}", other),
            }),
        }
    }

    fn auth_info(&self) -> Result<&Map<String, Value>> {
        self.data
            .get("authInfo")
            .and_then(Value::as_object)
            .ok_or_else(|| ArcgisError::MissingField {
                field: "authInfo".to_owned(),
                url: self.url.clone(),
            })
    }

    pub fn is_token_based_security(&self) -> Result<bool> {
        let flag = self
            .auth_info()?
            .get("isTokenBasedSecurity")
            .ok_or_else(|| ArcgisError::MissingField {
                field: "authInfo.isTokenBasedSecurity".to_owned(),
                url: self.url.clone(),
            })?;
        Ok(flag.as_bool().unwrap_or(false))
    }

    /// `authInfo.tokenServicesUrl`, absent when missing or empty.
    pub fn token_services_url(&self) -> Result<Option<&str>> {
        Ok(self
            .auth_info()?
            .get("tokenServicesUrl")
            .and_then(Value::as_str)
            .filter(|url| !url.trim().is_empty()))
    }

    /// A server federated with a portal advertises the portal it belongs to.
    pub fn is_federated(&self) -> bool {
        self.data.contains_key("owningSystemUrl")
    }

    pub fn owning_system_url(&self) -> Option<&str> {
        self.data.get("owningSystemUrl").and_then(Value::as_str)
    }
}

pub fn info_url(kind: EndpointKind, url: &str) -> Result<String> {
    let base = derive_base_url(url)?;
    let path = match kind {
        EndpointKind::Portal => "/sharing/rest/info",
        EndpointKind::Arcgis | EndpointKind::Geoevent => "/rest/info",
    };
    Ok(format!("{}{}", base, path))
}

/// GET the info document of the server behind `url`, optionally presenting
/// the public host so the server reports its public token service URL.
pub fn fetch_server_info(http: &Client, kind: EndpointKind, url: &str, public_host: Option<&str>) -> Result<ServerInfo> {
    let info_url = info_url(kind, url)?;
    debug!(info_url = %info_url, "fetching server info");

    let mut request = http.get(&info_url).query(&[("f", "json")]);
    if let Some(public_host) = public_host {
        request = request.header(HOST, public_host);
    }

    let response = request.send().map_err(|e| ArcgisError::UnreachableService {
        url: info_url.clone(),
        action: ACTION_SERVER_INFO.to_owned(),
        message: e.to_string(),
    })?;

    let data = read_esri_json(response, ACTION_SERVER_INFO).map_err(|err| match err {
        ArcgisError::Transport { status, url, action, message } => ArcgisError::UnreachableService {
            url,
            action,
            message: match status {
                Some(code) => format!("{} {}", code, message),
                None => message,
            },
        },
        ArcgisError::Decode { url, action } => ArcgisError::MalformedResponse {
            url,
            action,
            message: "body is not JSON".to_owned(),
        },
        other => other,
    })?;

    ServerInfo::from_value(&info_url, data)
}
