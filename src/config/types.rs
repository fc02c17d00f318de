use crate::catalog::ItemId;
use crate::ConfigError;
use serde::Deserialize;

/// Main configuration structure for Catalog-Relations
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub portal: PortalConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Portal connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Base URL of the portal (e.g., "https://www.arcgis.com")
    pub url: String,

    /// Access token appended to every request, if the portal needs one
    #[serde(default)]
    pub token: Option<String>,
}

/// Root item discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Owner whose items are used as roots (defaults to the token's user)
    #[serde(default)]
    pub owner: Option<String>,

    /// Start of the creation-date window (epoch milliseconds)
    #[serde(rename = "start-date", default = "default_start_date")]
    pub start_date: i64,

    /// Explicit root ids; when non-empty the catalog search is skipped
    #[serde(default)]
    pub roots: Vec<String>,

    /// Stop searching once this many root ids were found
    #[serde(rename = "max-found-items", default)]
    pub max_found_items: Option<usize>,
}

impl SearchConfig {
    /// Parses the explicit root ids
    pub fn root_ids(&self) -> Result<Vec<ItemId>, ConfigError> {
        self.roots
            .iter()
            .map(|raw| {
                ItemId::parse(raw).map_err(|_| ConfigError::InvalidItemId(raw.to_string()))
            })
            .collect()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            owner: None,
            start_date: default_start_date(),
            roots: Vec::new(),
            max_found_items: None,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of attempts made to fetch an item before it is recorded as missed
    #[serde(rename = "fetch-attempts", default = "default_fetch_attempts")]
    pub fetch_attempts: u32,

    /// Delay between fetch attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Maximum number of root items walked at the same time
    #[serde(rename = "max-concurrent-roots", default = "default_max_concurrent_roots")]
    pub max_concurrent_roots: u32,

    /// Only walk the first N roots
    #[serde(rename = "max-root-items", default)]
    pub max_root_items: Option<usize>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            fetch_attempts: default_fetch_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            max_concurrent_roots: default_max_concurrent_roots(),
            max_root_items: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the related items CSV file
    #[serde(rename = "related-items-path")]
    pub related_items_path: String,

    /// Path to the missed items CSV file
    #[serde(rename = "missed-items-path")]
    pub missed_items_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,

    /// Path to the network graph HTML file
    #[serde(rename = "graph-path", default)]
    pub graph_path: Option<String>,
}

// 2016-01-01T00:00:00 US Eastern
fn default_start_date() -> i64 {
    1_451_624_400_000
}

fn default_fetch_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_max_concurrent_roots() -> u32 {
    1
}
