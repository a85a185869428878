use std::{fs, path::Path};
use crate::config::settings::{ClientFile, LoggingConfig};
use crate::config::proc_validator;
use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, error};

/// Load and validate config from YAML file
pub fn file_to_config(path: &Path) -> Result<ClientFile> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow!("unable to read config '{}': {}", path.display(), e))?;

    let expanded = expand_env_vars(&content);
    parse_config(expanded)
}

pub fn parse_config(content: String) -> Result<ClientFile> {
    let mut client_file: ClientFile = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
        })?;

    // Apply defaults
    if client_file.settings.logging.is_none() {
        client_file.settings.logging = Some(LoggingConfig::default());
    }

    debug!("validation config ...");
    proc_validator::validate_client_file(&client_file)
        .map_err(|errors| anyhow!("config is not valid: {}", errors.join("; ")))?;

    Ok(client_file)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
fn expand_env_vars(input: &str) -> String {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| {
        Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("env var pattern is valid")
    });
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::LogFormat;
    use serial_test::serial;
    use std::io::Write;

    const CONFIG: &str = r#"
settings:
  logging:
    level: debug
    format: json
server:
  host: gis.example.org
  username: ${ARCGIS_TEST_USER}
  password: ${ARCGIS_TEST_PASSWORD:fallback}
  web_adaptors:
    portal: portal
    server: server
  public_host: www.example.org
"#;

    #[test]
    #[serial]
    fn loads_file_with_env_expansion() {
        std::env::set_var("ARCGIS_TEST_USER", "alice");
        std::env::remove_var("ARCGIS_TEST_PASSWORD");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let client_file = file_to_config(file.path()).unwrap();
        let server = &client_file.server;
        assert_eq!(server.host, "gis.example.org");
        assert!(server.https);
        assert!(server.verify_ssl);
        assert_eq!(server.timeout_ms, 4000);
        assert_eq!(server.username.as_deref(), Some("alice"));
        assert_eq!(server.password.as_deref(), Some("fallback"));
        assert_eq!(server.web_adaptors.arcgis.as_deref(), Some("server"));
        assert_eq!(server.public_host.as_deref(), Some("www.example.org"));

        let logging = client_file.settings.logging.unwrap();
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);

        std::env::remove_var("ARCGIS_TEST_USER");
    }

    #[test]
    fn logging_defaults_when_absent() {
        let client_file = parse_config("server:\n  host: example.com\n".to_owned()).unwrap();
        let logging = client_file.settings.logging.unwrap();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Compact);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = parse_config("server:\n  host: https://example.com\n  timeout_ms: 0\n".to_owned()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("config is not valid"), "{message}");
        assert!(message.contains("scheme"), "{message}");
        assert!(message.contains("timeout_ms"), "{message}");
    }
}
