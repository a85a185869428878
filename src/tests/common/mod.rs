// tests/common/mod.rs
pub use serde_json::json;

use httpmock::Method::{GET, POST};
use httpmock::{Mock, MockServer};
use serde_json::Value;

use crate::config::service::ServiceConfig;
use crate::helpers::time::now_ms;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret";

/// Direct plain-HTTP connection to the mock server, with credentials.
pub fn mock_config(server: &MockServer) -> ServiceConfig {
    ServiceConfig::new(format!("127.0.0.1:{}", server.port()))
        .with_https(false)
        .with_verify_ssl(false)
        .with_credentials(USERNAME, PASSWORD)
}

/// Expiry one hour from now, in milliseconds.
pub fn expires_in_an_hour() -> i64 {
    now_ms() + 60 * 60 * 1000
}

pub fn token_body(token: &str) -> Value {
    json!({"token": token, "expires": expires_in_an_hour(), "ssl": false})
}

/// `{root}/rest/info` (or `{root}/sharing/rest/info`) advertising `token_url`.
pub fn mock_info<'a>(server: &'a MockServer, info_path: &str, token_url: &str, owning_system: Option<&str>) -> Mock<'a> {
    let mut body = json!({
        "currentVersion": 11.1,
        "authInfo": {
            "isTokenBasedSecurity": true,
            "tokenServicesUrl": token_url,
        }
    });
    if let Some(owning_system) = owning_system {
        body["owningSystemUrl"] = json!(owning_system);
    }
    let info_path = info_path.to_owned();
    server.mock(|when, then| {
        when.method(GET).path(info_path).query_param("f", "json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(body);
    })
}

/// `generateToken` answering credential requests with `token`.
pub fn mock_generate<'a>(server: &'a MockServer, token_path: &str, token: &str) -> Mock<'a> {
    let body = token_body(token);
    let token_path = token_path.to_owned();
    server.mock(|when, then| {
        when.method(POST)
            .path(token_path)
            .body_includes(format!("username={}", USERNAME))
            .body_includes(format!("password={}", PASSWORD));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(body);
    })
}

/// `generateToken` answering portal -> server token exchanges for
/// `server_url` with `token`.
pub fn mock_exchange<'a>(server: &'a MockServer, token_path: &str, server_url: &str, portal_token: &str, token: &str) -> Mock<'a> {
    let body = token_body(token);
    let token_path = token_path.to_owned();
    let server_url = format!("serverURL={}", form_encode(server_url));
    let portal_token = format!("token={}", portal_token);
    server.mock(|when, then| {
        when.method(POST)
            .path(token_path)
            .body_includes("f=json")
            .body_includes("expiration=60")
            .body_includes(server_url)
            .body_includes(portal_token);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(body);
    })
}

/// `application/x-www-form-urlencoded` value encoding.
pub fn form_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
