use anyhow::{Context, Result};
use std::path::Path;

use crate::config::proc_loader::file_to_config;
use crate::config::settings::ClientFile;

/// Load the client file named on the command line.
pub fn run(config_path: &str) -> Result<ClientFile> {
    file_to_config(Path::new(config_path)).with_context(|| format!("invalid client config '{}'", config_path))
}
