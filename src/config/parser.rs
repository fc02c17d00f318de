use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates the config file at `path`
///
/// ```no_run
/// use std::path::Path;
/// use catalog_relations::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Portal: {}", config.portal.url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Parses and validates config text
pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

/// Hex SHA-256 of the config file at `path`
///
/// Logged at startup and written into the summary, so every report names
/// the exact config that produced it.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(hash_text(&std::fs::read_to_string(path)?))
}

/// Loads a config file together with its hash
///
/// The file is read once, so the hash always matches the text that was
/// parsed even if the file changes underneath.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let text = std::fs::read_to_string(path)?;
    let config = parse_config(&text)?;
    Ok((config, hash_text(&text)))
}

fn hash_text(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
