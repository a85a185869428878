//! Client configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - host must be a bare host[:port]
//! - credentials are either complete or absent
//! - timeout and web adaptor names must be usable

use tracing::{error, info, warn};

use crate::config::service::ServiceConfig;
use crate::config::settings::{ClientFile, SettingsConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_client_file(cfg: &ClientFile) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_server(&cfg.server, &mut errors);

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        for e in &errors {
            error!("config error: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(logging) = &settings.logging {
        let level = logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

/// Validate a single server block.
pub fn validate_server(server: &ServiceConfig, errors: &mut Vec<String>) {
    let host = server.host.trim();
    if host.is_empty() {
        errors.push("server.host must not be empty".to_string());
    } else if host.contains("://") {
        errors.push(format!(
            "server.host '{}' must not contain a scheme; use server.https instead",
            server.host
        ));
    } else if host.contains('/') || host.contains('\\') {
        errors.push(format!(
            "server.host '{}' must not contain directories; use server.web_adaptors instead",
            server.host
        ));
    }

    match (&server.username, &server.password) {
        (Some(_), None) => errors.push("server.username is set but server.password is missing".to_string()),
        (None, Some(_)) => errors.push("server.password is set but server.username is missing".to_string()),
        _ => {}
    }

    if server.timeout_ms == 0 {
        errors.push("server.timeout_ms must be greater than 0".to_string());
    }

    for (name, adaptor) in [
        ("portal", &server.web_adaptors.portal),
        ("arcgis", &server.web_adaptors.arcgis),
    ] {
        if let Some(dir) = adaptor {
            if dir.trim_matches(['/', '\\', ' ']).is_empty() {
                errors.push(format!("server.web_adaptors.{} must not be blank", name));
            }
        }
    }

    if server.credentials().is_some() && !server.https && server.verify_ssl {
        warn!("credentials configured over plain HTTP with verify_ssl enabled; token requests will be refused");
    }
}
