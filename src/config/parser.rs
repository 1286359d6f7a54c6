use std::fs;
use std::path::{Path, PathBuf};

use super::types::ServerConfig;
use crate::{Error, Result};

pub fn parse_config_file(path: impl AsRef<Path>) -> Result<ServerConfig> {
    let content = fs::read_to_string(path)?;
    parse_config_string(&content)
}

/// Parse `key = value` lines. Blank lines and `#` comments are skipped,
/// `listen` may repeat, anything unrecognised is an error.
pub fn parse_config_string(content: &str) -> Result<ServerConfig> {
    let mut config = ServerConfig::default();
    let mut listen_addresses = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(config_error(line_no, format!("expected `key = value`, got `{line}`")));
        };
        let (key, value) = (key.trim(), value.trim());

        if value.is_empty() {
            return Err(config_error(line_no, format!("`{key}` has no value")));
        }

        match key {
            "listen" => listen_addresses.push(value.to_string()),
            "root" => config.root = PathBuf::from(value),
            "error_path" => config.error_path = Some(PathBuf::from(value)),
            other => return Err(config_error(line_no, format!("unknown setting `{other}`"))),
        }
    }

    if !listen_addresses.is_empty() {
        config.listen_addresses = listen_addresses;
    }

    Ok(config)
}

fn config_error(line: usize, message: String) -> Error {
    Error::Config { line, message }
}
