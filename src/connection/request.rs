use http::header::{ACCEPT, COOKIE};
use http::{HeaderMap, HeaderValue, Method};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, warn};

use crate::client::ClientContext;
use crate::connection::body::RequestBody;
use crate::connection::{RequestOutcome, SUPPORTED_METHODS};
use crate::endpoints::kind::EndpointKind;
use crate::endpoints::url::assemble_url;
use crate::error::{ArcgisError, Result};
use crate::observability::metrics::get_metrics;
use crate::parser::response::{check_status, read_esri_json};
use crate::sources::TokenIssuer;

/// Send one request of any supported method, adjusting the body and headers
/// to carry the token and format, then check the response for errors.
pub(crate) fn execute(
    http: &Client,
    kind: EndpointKind,
    context: &ClientContext,
    method: Method,
    path: &str,
    body: RequestBody,
    admin: bool,
) -> Result<RequestOutcome> {
    let metrics = get_metrics();
    let start = Instant::now();
    metrics.requests.with_label_values(&[kind.as_str(), method.as_str()]).inc();

    let outcome = dispatch(http, kind, context, method, path, body, admin);

    metrics.request_duration.with_label_values(&[kind.as_str()]).observe(start.elapsed().as_secs_f64());
    if let Err(err) = &outcome {
        metrics.request_failures.with_label_values(&[kind.as_str(), err.label()]).inc();
        warn!(endpoint = kind.as_str(), path, error = %err, "request failed");
    }
    outcome
}

fn dispatch(
    http: &Client,
    kind: EndpointKind,
    context: &ClientContext,
    method: Method,
    path: &str,
    mut body: RequestBody,
    admin: bool,
) -> Result<RequestOutcome> {
    let config = &context.config;

    if !SUPPORTED_METHODS.contains(&method) {
        return Err(ArcgisError::InvalidMethod {
            method: method.to_string(),
            path: path.to_owned(),
        });
    }

    // GeoEvent cannot be reached through ArcGIS Server's web adaptor
    if kind == EndpointKind::Geoevent && config.web_adaptor(EndpointKind::Arcgis).is_some() {
        return Err(ArcgisError::UnsupportedRouting { kind: kind.as_str() });
    }

    let url = assemble_url(kind, config, path, admin);
    let action = format!("executing a {} request", method.as_str().to_lowercase());
    let status_only = method == Method::HEAD || method == Method::OPTIONS;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if !status_only {
        let token = match config.credentials() {
            Some(credentials) => Some(
                TokenIssuer::new(http, &context.cache, config)
                    .get_token(kind, &url, credentials)?
                    .token,
            ),
            None => None,
        };

        body.mixin(&method, token.as_deref());

        // GeoEvent reads its token from a cookie
        if let (EndpointKind::Geoevent, Some(token)) = (kind, token.as_deref()) {
            let cookie = HeaderValue::from_str(&format!("adminToken={}", token)).map_err(|_| ArcgisError::MalformedResponse {
                url: url.clone(),
                action: action.clone(),
                message: "token is not a valid cookie value".to_owned(),
            })?;
            headers.insert(COOKIE, cookie);
        }
    }

    debug!(method = %method, url = %url, "sending request");
    let request = build_request(http, method, &url, headers, body)?;
    let response = request.send().map_err(|e| ArcgisError::transport(&url, &action, &e))?;

    let status = response.status();
    let final_url = response.url().to_string();
    let response_headers = response.headers().clone();

    let body = if status_only {
        check_status(status, &final_url, &action)?;
        Value::Null
    } else {
        read_esri_json(response, &action)?
    };

    Ok(RequestOutcome {
        status,
        url: final_url,
        headers: response_headers,
        body,
    })
}

fn build_request(http: &Client, method: Method, url: &str, headers: HeaderMap, body: RequestBody) -> Result<RequestBuilder> {
    let RequestBody { params, data, json, files } = body;
    let mut request = http.request(method, url).headers(headers);

    if let Some(params) = &params {
        request = request.query(params);
    }

    if !files.is_empty() {
        let mut form = Form::new();
        for (key, value) in data.unwrap_or_default() {
            form = form.text(key, value);
        }
        for file in files {
            let mut part = Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(mime) = &file.mime {
                part = part
                    .mime_str(mime)
                    .map_err(|e| ArcgisError::transport(url, "preparing a file upload", &e))?;
            }
            form = form.part(file.field, part);
        }
        request = request.multipart(form);
    } else if let Some(data) = &data {
        request = request.form(data);
    } else if let Some(json) = &json {
        request = request.json(json);
    }

    Ok(request)
}
