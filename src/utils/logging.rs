use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::settings::{LogFormat, LoggingConfig, SettingsConfig};

/// Level accepted on the command line, overriding `settings.logging.level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Effective logging config: the CLI level wins over the file, the file over
/// the defaults (info, compact).
pub fn resolve(settings: &SettingsConfig, cli_level: Option<LogLevel>) -> LoggingConfig {
    let mut logging = settings.logging.clone().unwrap_or_default();
    if let Some(level) = cli_level {
        logging.level = Level::from(level).as_str().to_lowercase();
    }
    logging
}

pub fn run(settings: &SettingsConfig, cli_level: Option<LogLevel>) {
    init_logging(&resolve(settings, cli_level));
}

/// Install the global subscriber on stderr, leaving stdout to responses.
/// `RUST_LOG` directives, when present, replace the configured level.
pub fn init_logging(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match cfg.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    // a subscriber installed earlier (tests, embedding apps) stays in place
    if installed.is_err() {
        tracing::debug!("global subscriber already set");
    }
}
