use http::StatusCode;
use reqwest::blocking::Response;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ArcgisError, Result};

const DEFAULT_CODE: &str = "X";
const DEFAULT_MESSAGE: &str = "No Message";
const DEFAULT_DETAILS: &str = "No Details";

/// Read a JSON response from an ArcGIS server, raising an error for HTTP
/// failures, unreadable JSON and errors reported inside the body.
pub fn read_esri_json(response: Response, action: &str) -> Result<Value> {
    let status = response.status();
    let url = response.url().to_string();
    check_status(status, &url, action)?;

    let body = response
        .text()
        .map_err(|e| ArcgisError::transport(&url, action, &e))?;
    classify(status, &url, &body, action)
}

/// Fail on a non-success status code.
pub fn check_status(status: StatusCode, url: &str, action: &str) -> Result<()> {
    if status.is_client_error() || status.is_server_error() {
        warn!(status = status.as_u16(), url, action, "HTTP error status");
        return Err(ArcgisError::Transport {
            status: Some(status.as_u16()),
            url: url.to_owned(),
            action: action.to_owned(),
            message: status.canonical_reason().unwrap_or("Unknown Status").to_owned(),
        });
    }
    Ok(())
}

/// Classify a completed exchange: status, then JSON decoding, then the
/// `error` / `success` envelope. Returns the decoded body unchanged.
pub fn classify(status: StatusCode, url: &str, body: &str, action: &str) -> Result<Value> {
    check_status(status, url, action)?;

    let data: Value = serde_json::from_str(body).map_err(|e| {
        debug!(url, action, error = %e, "response body is not JSON");
        ArcgisError::Decode {
            url: url.to_owned(),
            action: action.to_owned(),
        }
    })?;

    if let Some(error) = data.get("error").and_then(Value::as_object) {
        return Err(application_error(error, url, action));
    }

    if data.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ArcgisError::Application {
            code: DEFAULT_CODE.to_owned(),
            message: format!("unsuccessful response from ArcGIS: {}", data),
            details: DEFAULT_DETAILS.to_owned(),
            url: url.to_owned(),
            action: action.to_owned(),
        });
    }

    Ok(data)
}

fn application_error(error: &Map<String, Value>, url: &str, action: &str) -> ArcgisError {
    let code = match error.get("code") {
        Some(Value::String(code)) => code.clone(),
        Some(Value::Null) | None => DEFAULT_CODE.to_owned(),
        Some(other) => other.to_string(),
    };

    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MESSAGE)
        .to_owned();

    let details = match error.get("details").and_then(Value::as_array) {
        Some(details) if !details.is_empty() => details
            .iter()
            .map(|detail| match detail {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        // an empty list reads as no details rather than an empty string
        _ => DEFAULT_DETAILS.to_owned(),
    };

    warn!(url, action, code = %code, message = %message, "ArcGIS reported an error");
    ArcgisError::Application {
        code,
        message,
        details,
        url: url.to_owned(),
        action: action.to_owned(),
    }
}
