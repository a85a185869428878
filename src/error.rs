use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArcgisError>;

/// Every failure the client surfaces. Variants carry the offending URL and
/// a short description of the attempted action wherever one is known.
#[derive(Debug, Error)]
pub enum ArcgisError {
    #[error("the URL \"{url}\" is malformed: {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error("unsupported request method '{method}' for '{path}'; must be GET, OPTIONS, HEAD, POST, PUT, PATCH, or DELETE")]
    InvalidMethod { method: String, path: String },

    #[error("sending a {kind} request via a proxied (web adaptor) endpoint is not supported; use a direct connection")]
    UnsupportedRouting { kind: &'static str },

    #[error("the server at \"{url}\" does not use token based security")]
    UnsupportedAuthScheme { url: String },

    #[error("the server info retrieved for \"{url}\" does not contain a token service URL; try specifying a public host")]
    MissingTokenService { url: String },

    #[error("not authorized to send credentials to \"{url}\" over an unencrypted connection; use HTTPS or disable SSL verification")]
    InsecureCredentialTransmission { url: String },

    #[error("unable to reach the service while {action} at \"{url}\" >> {message}")]
    UnreachableService {
        url: String,
        action: String,
        message: String,
    },

    #[error("HTTP error while {action} at \"{url}\" >> {}", status_text(.status, .message))]
    Transport {
        status: Option<u16>,
        url: String,
        action: String,
        message: String,
    },

    #[error("unable to read the JSON while {action} at \"{url}\"")]
    Decode { url: String, action: String },

    #[error("unexpected response while {action} at \"{url}\" >> {message}")]
    MalformedResponse {
        url: String,
        action: String,
        message: String,
    },

    #[error("field '{field}' is missing from the response of \"{url}\"")]
    MissingField { field: String, url: String },

    #[error("ArcGIS error while {action} at \"{url}\" >> {code}: {message} - {details}")]
    Application {
        code: String,
        message: String,
        details: String,
        url: String,
        action: String,
    },

    #[error("failed to build the HTTP client: {0}")]
    HttpClient(String),
}

fn status_text(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("{} {}", code, message),
        None => message.to_owned(),
    }
}

impl ArcgisError {
    /// Short static tag, used as a metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            ArcgisError::MalformedUrl { .. } => "malformed_url",
            ArcgisError::InvalidMethod { .. } => "invalid_method",
            ArcgisError::UnsupportedRouting { .. } => "unsupported_routing",
            ArcgisError::UnsupportedAuthScheme { .. } => "unsupported_auth_scheme",
            ArcgisError::MissingTokenService { .. } => "missing_token_service",
            ArcgisError::InsecureCredentialTransmission { .. } => "insecure_credentials",
            ArcgisError::UnreachableService { .. } => "unreachable",
            ArcgisError::Transport { .. } => "transport",
            ArcgisError::Decode { .. } => "decode",
            ArcgisError::MalformedResponse { .. } => "malformed_response",
            ArcgisError::MissingField { .. } => "missing_field",
            ArcgisError::Application { .. } => "application",
            ArcgisError::HttpClient(_) => "http_client",
        }
    }

    pub(crate) fn malformed_url(url: &str, reason: impl Into<String>) -> Self {
        ArcgisError::MalformedUrl {
            url: url.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transport(url: &str, action: &str, err: &reqwest::Error) -> Self {
        ArcgisError::Transport {
            status: err.status().map(|s| s.as_u16()),
            url: url.to_owned(),
            action: action.to_owned(),
            message: err.to_string(),
        }
    }
}
