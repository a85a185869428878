use serde::Deserialize;

use crate::config::service::ServiceConfig;

/// Client file: process settings plus the deployment to talk to.
///
/// ```yaml
/// settings:
///   logging: { level: info, format: compact }
/// server:
///   host: gis.example.org
///   username: ${ARCGIS_USER}
///   password: ${ARCGIS_PASSWORD}
/// ```
#[derive(Debug, Deserialize, Clone)]
pub struct ClientFile {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub server: ServiceConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(default_level(), LogFormat::default())
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

fn default_level() -> String {
    "info".to_owned()
}
