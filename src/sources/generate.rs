use reqwest::blocking::Client;
use serde_json::Value;
use tracing::info;

use crate::cache::token::TokenEntry;
use crate::config::service::Credentials;
use crate::endpoints::url::is_https;
use crate::error::{ArcgisError, Result};
use crate::parser::response::read_esri_json;

pub const ACTION_GENERATE: &str = "getting a token";
pub const ACTION_EXCHANGE: &str = "swapping portal token for server token";

/// Requested token lifetime, minutes.
pub const TOKEN_EXPIRATION_MINUTES: &str = "60";

/// POST credentials to a `generateToken` endpoint. Without a referer the
/// token is scoped to the requesting IP.
pub fn generate_token(
    http: &Client,
    token_url: &str,
    credentials: Credentials<'_>,
    referer: Option<&str>,
    verify_ssl: bool,
) -> Result<TokenEntry> {
    ensure_secure(token_url, verify_ssl)?;
    info!(token_url, username = credentials.username, referer, "generating token");

    let client = if referer.is_some() { "referer" } else { "requestip" };
    let form = [
        ("f", "json"),
        ("expiration", TOKEN_EXPIRATION_MINUTES),
        ("username", credentials.username),
        ("password", credentials.password),
        ("client", client),
        ("referer", referer.unwrap_or_default()),
    ];

    post_token_form(http, token_url, &form, ACTION_GENERATE)
}

/// Swap a portal token for a token valid on the federated server `server_url`.
pub fn exchange_token(
    http: &Client,
    token_url: &str,
    server_url: &str,
    portal_token: &str,
    verify_ssl: bool,
) -> Result<TokenEntry> {
    ensure_secure(token_url, verify_ssl)?;
    info!(token_url, server_url, "exchanging portal token for server token");

    let form = [
        ("f", "json"),
        ("expiration", TOKEN_EXPIRATION_MINUTES),
        ("serverURL", server_url),
        ("token", portal_token),
    ];

    post_token_form(http, token_url, &form, ACTION_EXCHANGE)
}

fn ensure_secure(token_url: &str, verify_ssl: bool) -> Result<()> {
    if verify_ssl && !is_https(token_url) {
        return Err(ArcgisError::InsecureCredentialTransmission {
            url: token_url.to_owned(),
        });
    }
    Ok(())
}

fn post_token_form(http: &Client, token_url: &str, form: &[(&str, &str)], action: &str) -> Result<TokenEntry> {
    let response = http
        .post(token_url)
        .form(form)
        .send()
        .map_err(|e| ArcgisError::transport(token_url, action, &e))?;

    let data = read_esri_json(response, action)?;
    parse_token_entry(token_url, action, data)
}

fn parse_token_entry(token_url: &str, action: &str, data: Value) -> Result<TokenEntry> {
    if data.get("token").and_then(Value::as_str).is_none() {
        return Err(ArcgisError::MissingField {
            field: "token".to_owned(),
            url: token_url.to_owned(),
        });
    }
    serde_json::from_value(data).map_err(|e| ArcgisError::MalformedResponse {
        url: token_url.to_owned(),
        action: action.to_owned(),
        message: e.to_string(),
    })
}
