//! Request dispatch for a single endpoint kind.
//!
//! A `Connection` resolves the URL, obtains a token when credentials are
//! configured, mixes the token and format into the request and classifies
//! the response. A `Session` does the same over one pooled HTTP client.

pub mod body;
pub mod request;
pub mod session;

use http::{HeaderMap, Method, StatusCode};
use reqwest::blocking::Client;
use serde_json::Value;
use std::sync::Arc;

use crate::client::ClientContext;
use crate::config::service::ServiceConfig;
use crate::endpoints::kind::EndpointKind;
use crate::endpoints::url::assemble_url;
use crate::error::{ArcgisError, Result};

pub use body::{Params, RequestBody, UploadFile};
pub use session::Session;

pub const SUPPORTED_METHODS: [Method; 7] = [
    Method::GET,
    Method::OPTIONS,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Decoded response. `body` is `Value::Null` for HEAD and OPTIONS.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub status: StatusCode,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Verb helpers over a single `request` entry point.
pub trait Dispatch {
    fn request(&self, method: Method, path: &str, body: RequestBody, admin: bool) -> Result<RequestOutcome>;

    fn head(&self, path: &str, admin: bool) -> Result<RequestOutcome> {
        self.request(Method::HEAD, path, RequestBody::default(), admin)
    }

    fn options(&self, path: &str, admin: bool) -> Result<RequestOutcome> {
        self.request(Method::OPTIONS, path, RequestBody::default(), admin)
    }

    fn get(&self, path: &str, params: Option<Params>, admin: bool) -> Result<RequestOutcome> {
        let body = RequestBody { params, ..Default::default() };
        self.request(Method::GET, path, body, admin)
    }

    fn post(&self, path: &str, body: RequestBody, admin: bool) -> Result<RequestOutcome> {
        self.request(Method::POST, path, body, admin)
    }

    fn put(&self, path: &str, body: RequestBody, admin: bool) -> Result<RequestOutcome> {
        self.request(Method::PUT, path, body, admin)
    }

    fn patch(&self, path: &str, body: RequestBody, admin: bool) -> Result<RequestOutcome> {
        self.request(Method::PATCH, path, body, admin)
    }

    fn delete(&self, path: &str, admin: bool) -> Result<RequestOutcome> {
        self.request(Method::DELETE, path, RequestBody::default(), admin)
    }
}

/// Connection handler for one endpoint server (portal, arcgis or geoevent).
#[derive(Debug, Clone)]
pub struct Connection {
    kind: EndpointKind,
    context: Arc<ClientContext>,
}

impl Connection {
    pub(crate) fn new(kind: EndpointKind, context: Arc<ClientContext>) -> Self {
        Self { kind, context }
    }

    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    /// Full URL a request to `path` would be sent to.
    pub fn url_for(&self, path: &str, admin: bool) -> String {
        assemble_url(self.kind, &self.context.config, path, admin)
    }

    /// Open a session: consecutive requests share one pooled HTTP client
    /// until the returned guard is dropped.
    pub fn session(&self) -> Result<Session<'_>> {
        let http = build_http_client(&self.context.config)?;
        Ok(Session::open(self, http))
    }

    pub(crate) fn context(&self) -> &ClientContext {
        &self.context
    }
}

impl Dispatch for Connection {
    fn request(&self, method: Method, path: &str, body: RequestBody, admin: bool) -> Result<RequestOutcome> {
        let http = build_http_client(&self.context.config)?;
        request::execute(&http, self.kind, &self.context, method, path, body, admin)
    }
}

/// Blocking HTTP client honouring the timeout and certificate verification.
pub fn build_http_client(config: &ServiceConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .danger_accept_invalid_certs(!config.verify_ssl)
        .build()
        .map_err(|e| ArcgisError::HttpClient(e.to_string()))
}

/// Parse and validate a request method name (case-insensitive).
pub fn parse_method(method: &str) -> Result<Method> {
    let invalid = || ArcgisError::InvalidMethod {
        method: method.to_owned(),
        path: String::new(),
    };
    let parsed = Method::from_bytes(method.trim().to_uppercase().as_bytes()).map_err(|_| invalid())?;
    if SUPPORTED_METHODS.contains(&parsed) {
        Ok(parsed)
    } else {
        Err(invalid())
    }
}
