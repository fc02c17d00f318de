use crate::config::types::{Config, CrawlerConfig, OutputConfig, PortalConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_portal_config(&config.portal)?;
    validate_search_config(&config.search)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates portal configuration
fn validate_portal_config(config: &PortalConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid portal url '{}': {}", config.url, e))
    })?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "Portal url '{}' must use http or https",
            config.url
        )));
    }

    if let Some(token) = &config.token {
        if token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "token cannot be blank; omit it instead".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates root discovery configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.start_date < 0 {
        return Err(ConfigError::Validation(format!(
            "start_date must be a non-negative epoch timestamp, got {}",
            config.start_date
        )));
    }

    if let Some(owner) = &config.owner {
        validate_owner(owner)?;
    }

    if config.max_found_items == Some(0) {
        return Err(ConfigError::Validation(
            "max_found_items must be >= 1 when set".to_string(),
        ));
    }

    // Fails on the first malformed id
    config.root_ids()?;

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.fetch_attempts < 1 || config.fetch_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "fetch_attempts must be between 1 and 10, got {}",
            config.fetch_attempts
        )));
    }

    if config.retry_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "retry_delay_ms must be <= 60000ms, got {}ms",
            config.retry_delay_ms
        )));
    }

    if config.max_concurrent_roots < 1 || config.max_concurrent_roots > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_roots must be between 1 and 64, got {}",
            config.max_concurrent_roots
        )));
    }

    if config.max_root_items == Some(0) {
        return Err(ConfigError::Validation(
            "max_root_items must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.related_items_path.is_empty() {
        return Err(ConfigError::Validation(
            "related_items_path cannot be empty".to_string(),
        ));
    }

    if config.missed_items_path.is_empty() {
        return Err(ConfigError::Validation(
            "missed_items_path cannot be empty".to_string(),
        ));
    }

    if config.related_items_path == config.missed_items_path {
        return Err(ConfigError::Validation(format!(
            "related_items_path and missed_items_path must differ, both are '{}'",
            config.related_items_path
        )));
    }

    for (name, path) in [
        ("summary_path", &config.summary_path),
        ("graph_path", &config.graph_path),
    ] {
        if matches!(path, Some(p) if p.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} cannot be empty; omit it instead",
                name
            )));
        }
    }

    Ok(())
}

/// Owner names are portal usernames
fn validate_owner(owner: &str) -> Result<(), ConfigError> {
    if owner.is_empty() {
        return Err(ConfigError::Validation("owner cannot be empty".to_string()));
    }

    if !owner
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
    {
        return Err(ConfigError::Validation(format!(
            "owner must contain only alphanumerics, '_', '-', '.' or '@', got '{}'",
            owner
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            portal: PortalConfig {
                url: "https://www.arcgis.com".to_string(),
                token: None,
            },
            search: SearchConfig::default(),
            crawler: CrawlerConfig::default(),
            output: OutputConfig {
                related_items_path: "related_items.csv".to_string(),
                missed_items_path: "missed_items.csv".to_string(),
                summary_path: None,
                graph_path: None,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_owner() {
        assert!(validate_owner("jdoe").is_ok());
        assert!(validate_owner("j.doe_org").is_ok());
        assert!(validate_owner("jdoe@example.com").is_ok());

        assert!(validate_owner("").is_err());
        assert!(validate_owner("j doe").is_err());
        assert!(validate_owner("owner:*").is_err());
    }

    #[test]
    fn test_rejects_non_http_portal() {
        let mut config = valid_config();
        config.portal.url = "ftp://portal.example.com".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_blank_token() {
        let mut config = valid_config();
        config.portal.token = Some("   ".to_string());
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_malformed_root_id() {
        let mut config = valid_config();
        config.search.roots = vec!["not-an-id".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidItemId(_))
        ));
    }

    #[test]
    fn test_fetch_attempts_bounds() {
        let mut config = valid_config();
        config.crawler.fetch_attempts = 0;
        assert!(validate(&config).is_err());

        config.crawler.fetch_attempts = 11;
        assert!(validate(&config).is_err());

        config.crawler.fetch_attempts = 3;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_output_paths_must_differ() {
        let mut config = valid_config();
        config.output.missed_items_path = config.output.related_items_path.clone();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_optional_path_rejected() {
        let mut config = valid_config();
        config.output.graph_path = Some(String::new());
        assert!(validate(&config).is_err());
    }
}
