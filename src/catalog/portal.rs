//! Portal REST client
//!
//! This module talks to a portal's `sharing/rest` API, including:
//! - Building the HTTP client with a proper user agent and timeouts
//! - Item metadata and item data requests
//! - Draft/published resource selection for dual-resource item types
//! - Paged catalog search
//! - Mapping portal error envelopes to [`CatalogError`]

use crate::catalog::{Catalog, CatalogError, CatalogResult, Item, ItemId, ItemPayloads};
use crate::config::PortalConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Resource name of the published copy of a dual-resource item
const PUBLISHED_RESOURCE: &str = "published_data.json";

/// Resource read when an item has neither a draft keyword nor a published copy
const DEFAULT_DRAFT_RESOURCE: &str = "draft.json";

/// Type keyword prefix naming the draft resource (`smdraftresourceid:<name>`)
const DRAFT_KEYWORD_PREFIX: &str = "smdraftresourceid";

/// One page of catalog search results
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub start: i64,

    #[serde(default)]
    pub num: i64,

    /// 1-based offset of the next page, or -1 when there is none
    #[serde(default = "no_next_page")]
    pub next_start: i64,

    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// A single search hit
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: ItemId,

    #[serde(default)]
    pub created: i64,
}

fn no_next_page() -> i64 {
    -1
}

#[derive(Debug, Deserialize)]
struct ResourceList {
    #[serde(default)]
    resources: Vec<ResourceEntry>,
}

#[derive(Debug, Deserialize)]
struct ResourceEntry {
    resource: String,
}

#[derive(Debug, Deserialize)]
struct SelfResponse {
    username: Option<String>,
}

/// REST client for a portal catalog
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: Client,
    portal_url: Url,
    rest_base: Url,
    token: Option<String>,
}

impl PortalClient {
    /// Creates a client for the portal at `portal_url`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use catalog_relations::catalog::PortalClient;
    ///
    /// let client = PortalClient::new("https://www.arcgis.com", None).unwrap();
    /// ```
    pub fn new(portal_url: &str, token: Option<String>) -> CatalogResult<Self> {
        let mut portal_url = Url::parse(portal_url)?;
        if !portal_url.path().ends_with('/') {
            let path = format!("{}/", portal_url.path());
            portal_url.set_path(&path);
        }
        let rest_base = portal_url.join("sharing/rest/")?;

        let client = Client::builder()
            .user_agent(concat!("catalog-relations/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|source| CatalogError::Http {
                url: rest_base.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            portal_url,
            rest_base,
            token,
        })
    }

    /// Creates a client from the `[portal]` configuration section
    pub fn from_config(config: &PortalConfig) -> CatalogResult<Self> {
        Self::new(&config.url, config.token.clone())
    }

    /// Portal home page link for an item
    pub fn item_page_url(&self, id: &ItemId) -> String {
        format!("{}home/item.html?id={}", self.portal_url, id)
    }

    /// Username the configured token belongs to
    pub async fn current_username(&self) -> CatalogResult<String> {
        let url = self.endpoint("community/self", true)?;
        let value = self.get_json(url.clone()).await?;
        let me: SelfResponse = decode(&url, value)?;
        me.username.ok_or_else(|| {
            CatalogError::Unavailable(
                "portal did not report a username; set search.owner or a token".to_string(),
            )
        })
    }

    /// Runs one page of a catalog search, sorted by creation date ascending
    ///
    /// `start` is 1-based, as the portal expects.
    pub async fn search(&self, query: &str, start: i64, num: u32) -> CatalogResult<SearchPage> {
        let mut url = self.endpoint("search", true)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("start", &start.to_string())
            .append_pair("num", &num.to_string())
            .append_pair("sortField", "created")
            .append_pair("sortOrder", "asc");
        let value = self.get_json(url.clone()).await?;
        decode(&url, value)
    }

    async fn list_resources(&self, id: &ItemId) -> CatalogResult<Vec<String>> {
        let mut url = self.endpoint(&format!("content/items/{}/resources", id), true)?;
        url.query_pairs_mut().append_pair("num", "1000");
        let value = self.get_json(url.clone()).await?;
        let list: ResourceList = decode(&url, value)?;
        Ok(list.resources.into_iter().map(|r| r.resource).collect())
    }

    async fn get_resource(&self, id: &ItemId, name: &str) -> CatalogResult<Option<Value>> {
        let url = self.endpoint(&format!("content/items/{}/resources/{}", id, name), false)?;
        self.get_payload(url).await
    }

    /// Builds an endpoint URL under `sharing/rest/`
    fn endpoint(&self, path: &str, json: bool) -> CatalogResult<Url> {
        let mut url = self.rest_base.join(path)?;
        if json {
            url.query_pairs_mut().append_pair("f", "json");
        }
        if let Some(token) = &self.token {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> CatalogResult<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| CatalogError::Http {
                url: redact(&url),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: redact(&url),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| CatalogError::Http {
            url: redact(&url),
            source,
        })
    }

    async fn get_json(&self, url: Url) -> CatalogResult<Value> {
        let body = self.get_text(url.clone()).await?;
        let value: Value = serde_json::from_str(&body).map_err(|e| CatalogError::Decode {
            url: redact(&url),
            message: e.to_string(),
        })?;

        match portal_error(&value) {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }

    /// Fetches a payload: JSON when it parses, raw text otherwise, `None` when empty
    async fn get_payload(&self, url: Url) -> CatalogResult<Option<Value>> {
        let body = self.get_text(url).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => match portal_error(&value) {
                Some(err) => Err(err),
                None => Ok(Some(value)),
            },
            Err(_) => Ok(Some(Value::String(body))),
        }
    }
}

#[async_trait]
impl Catalog for PortalClient {
    async fn fetch_item(&self, id: &ItemId) -> CatalogResult<Item> {
        let url = self.endpoint(&format!("content/items/{}", id), true)?;
        let value = self.get_json(url.clone()).await?;
        decode(&url, value)
    }

    async fn item_payloads(&self, item: &Item) -> CatalogResult<ItemPayloads> {
        if !item.has_dual_resources() {
            let url = self.endpoint(&format!("content/items/{}/data", item.id), true)?;
            let primary = self.get_payload(url).await?;
            return Ok(ItemPayloads {
                primary,
                secondary: None,
            });
        }

        let resources = self.list_resources(&item.id).await?;
        let (primary_name, secondary_name) =
            select_story_resources(&resources, &item.type_keywords);
        tracing::trace!(
            "Item {} reads resources {} / {:?}",
            item.id,
            primary_name,
            secondary_name
        );

        let primary = self.get_resource(&item.id, &primary_name).await?;
        let secondary = match secondary_name {
            Some(name) => self.get_resource(&item.id, &name).await?,
            None => None,
        };

        Ok(ItemPayloads { primary, secondary })
    }
}

/// Chooses which resources hold a dual-resource item's references
///
/// | Published copy | Draft keyword | Primary      | Secondary   |
/// |----------------|---------------|--------------|-------------|
/// | yes            | no            | published    | -           |
/// | no             | yes           | draft        | -           |
/// | yes            | yes           | draft        | published   |
/// | no             | no            | `draft.json` | -           |
pub fn select_story_resources(
    resources: &[String],
    type_keywords: &[String],
) -> (String, Option<String>) {
    let has_published = resources.iter().any(|r| r == PUBLISHED_RESOURCE);
    let draft = type_keywords
        .iter()
        .filter(|k| k.starts_with(DRAFT_KEYWORD_PREFIX))
        .filter_map(|k| k.split(':').nth(1))
        .filter(|name| !name.is_empty())
        .last()
        .map(str::to_string);

    match (draft, has_published) {
        (None, true) => (PUBLISHED_RESOURCE.to_string(), None),
        (Some(draft), false) => (draft, None),
        (Some(draft), true) => (draft, Some(PUBLISHED_RESOURCE.to_string())),
        (None, false) => (DEFAULT_DRAFT_RESOURCE.to_string(), None),
    }
}

/// Portals answer failures with HTTP 200 and an `{"error": {...}}` envelope
fn portal_error(value: &Value) -> Option<CatalogError> {
    let error = value.get("error")?.as_object()?;
    let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown portal error")
        .to_string();
    Some(CatalogError::Portal { code, message })
}

fn decode<T: serde::de::DeserializeOwned>(url: &Url, value: Value) -> CatalogResult<T> {
    serde_json::from_value(value).map_err(|e| CatalogError::Decode {
        url: redact(url),
        message: e.to_string(),
    })
}

/// Drops the token from URLs that end up in error messages and logs
fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "token")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(pairs);
    }
    clean.to_string()
}
