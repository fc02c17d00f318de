//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for a portal's REST API and run the
//! full crawl cycle end-to-end: root discovery, traversal, reconciliation and
//! report writing.

use catalog_relations::catalog::{enumerate_roots, ItemId, PortalClient, SearchWindow};
use catalog_relations::config::{load_config, CrawlerConfig, SearchConfig};
use catalog_relations::crawler::{resolve_roots, run_crawl, Coordinator};
use catalog_relations::output::{generate_summary, report_writers, write_reports};
use catalog_relations::state::EdgeStatus;
use catalog_relations::CrawlError;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

fn id(c: char) -> String {
    c.to_string().repeat(32)
}

fn item_id(c: char) -> ItemId {
    ItemId::parse(&id(c)).unwrap()
}

fn crawler_config(fetch_attempts: u32) -> CrawlerConfig {
    CrawlerConfig {
        fetch_attempts,
        retry_delay_ms: 1,
        max_concurrent_roots: 2,
        max_root_items: None,
    }
}

/// Matches when query parameter `key` contains `fragment`
struct QueryContains {
    key: &'static str,
    fragment: String,
}

impl QueryContains {
    fn new(key: &'static str, fragment: impl Into<String>) -> Self {
        Self {
            key,
            fragment: fragment.into(),
        }
    }
}

impl Match for QueryContains {
    fn matches(&self, request: &Request) -> bool {
        request
            .url
            .query_pairs()
            .any(|(k, v)| k == self.key && v.contains(&self.fragment))
    }
}

/// Mounts the metadata endpoint of an item
async fn mount_item(server: &MockServer, c: char, item_type: &str, keywords: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/sharing/rest/content/items/{}", id(c))))
        .and(query_param("f", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id(c),
            "title": format!("Item {}", c),
            "owner": "jdoe",
            "access": "public",
            "type": item_type,
            "typeKeywords": keywords,
            "orgId": "org1",
        })))
        .mount(server)
        .await;
}

/// Mounts the data endpoint of an item
async fn mount_data(server: &MockServer, c: char, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/sharing/rest/content/items/{}/data", id(c))))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Web map whose data references `refs`
async fn mount_web_map(server: &MockServer, c: char, refs: &[char]) {
    let layers: Vec<Value> = refs.iter().map(|r| json!({ "itemId": id(*r) })).collect();
    mount_item(server, c, "Web Map", &[]).await;
    mount_data(server, c, &json!({ "operationalLayers": layers }).to_string()).await;
}

/// StoryMap root `r`: the draft references `a`, the published copy `b`
async fn mount_story_map(server: &MockServer) {
    mount_item(server, 'r', "StoryMap", &["smdraftresourceid:draft_17.json"]).await;

    Mock::given(method("GET"))
        .and(path(format!("/sharing/rest/content/items/{}/resources", id('r'))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "resources": [
                { "resource": "draft_17.json" },
                { "resource": "published_data.json" },
            ],
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/sharing/rest/content/items/{}/resources/draft_17.json",
            id('r')
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": { "n-1": { "data": { "itemId": id('a') } } },
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/sharing/rest/content/items/{}/resources/published_data.json",
            id('r')
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": { "map-1": { "data": { "itemId": id('b') } } },
        })))
        .mount(server)
        .await;
}

/// r -> {a, b}, a -> c, b -> c, c -> d
async fn mount_diamond(server: &MockServer) {
    mount_story_map(server).await;
    mount_web_map(server, 'a', &['c']).await;
    mount_web_map(server, 'b', &['c']).await;

    mount_item(server, 'c', "Feature Service", &[]).await;
    mount_data(
        server,
        'c',
        &format!(r#"{{"url": "/sharing/rest/content/items/{}/data"}}"#, id('d')),
    )
    .await;

    mount_item(server, 'd', "Feature Service", &[]).await;
    mount_data(server, 'd', "").await;
}

fn rows(report: &catalog_relations::crawler::CrawlReport) -> Vec<(String, EdgeStatus)> {
    report
        .edges
        .iter()
        .map(|edge| {
            let path: String = edge
                .path
                .iter()
                .map(|id| id.as_str().chars().next().unwrap())
                .collect();
            (path, edge.status)
        })
        .collect()
}

#[tokio::test]
async fn test_full_crawl_against_portal() {
    let server = MockServer::start().await;
    mount_diamond(&server).await;

    let client = PortalClient::new(&server.uri(), None).expect("Failed to create client");
    let coordinator = Coordinator::new(Arc::new(client), &crawler_config(1));
    let report = coordinator.run(vec![item_id('r')]).await;

    assert_eq!(
        rows(&report),
        vec![
            ("a".to_string(), EdgeStatus::Resolved),
            ("ac".to_string(), EdgeStatus::Resolved),
            ("acd".to_string(), EdgeStatus::Resolved),
            ("b".to_string(), EdgeStatus::Resolved),
            ("bc".to_string(), EdgeStatus::Paused),
            ("bcd".to_string(), EdgeStatus::Reconciled),
        ]
    );
    assert!(report.misses.is_empty(), "unexpected misses: {:?}", report.misses);
    assert_eq!(report.reconcile.spliced, 1);
    assert!(report.edges.iter().all(|e| e.ancestor.id == item_id('r')));

    let d = report.edges.last().unwrap();
    assert_eq!(d.related.title, "Item d");
    assert_eq!(d.related.org_id.as_deref(), Some("org1"));
    assert_eq!(d.ancestor.type_label.as_str(), "StoryMap");
}

#[tokio::test]
async fn test_portal_error_becomes_missed_item() {
    let server = MockServer::start().await;
    mount_web_map(&server, 'r', &['a', 'm']).await;
    mount_web_map(&server, 'a', &[]).await;

    // Portals report failures as HTTP 200 with an error envelope
    Mock::given(method("GET"))
        .and(path(format!("/sharing/rest/content/items/{}", id('m'))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "code": 400, "message": "Item does not exist or is inaccessible." },
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = PortalClient::new(&server.uri(), None).unwrap();
    let report = Coordinator::new(Arc::new(client), &crawler_config(2))
        .run(vec![item_id('r')])
        .await;

    assert_eq!(rows(&report), vec![("a".to_string(), EdgeStatus::Resolved)]);
    assert_eq!(report.misses.len(), 1);
    assert_eq!(report.misses[0].id, item_id('m'));
    assert!(report.misses[0].error.contains("does not exist"));
}

#[tokio::test]
async fn test_unreachable_root_is_reported() {
    let server = MockServer::start().await;
    mount_web_map(&server, 'a', &[]).await;

    let client = PortalClient::new(&server.uri(), None).unwrap();
    let report = Coordinator::new(Arc::new(client), &crawler_config(1))
        .run(vec![item_id('z'), item_id('a')])
        .await;

    assert!(report.edges.is_empty());
    assert_eq!(report.roots.len(), 1);
    assert_eq!(report.roots[0].id, item_id('a'));
    assert_eq!(report.misses.len(), 1);
    assert!(report.misses[0].error.contains("404"));
}

#[tokio::test]
async fn test_search_pages_until_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sharing/rest/search"))
        .and(query_param("start", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3, "start": 1, "num": 2, "nextStart": 3,
            "results": [{ "id": id('a'), "created": 10 }, { "id": id('b'), "created": 20 }],
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sharing/rest/search"))
        .and(query_param("start", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3, "start": 3, "num": 1, "nextStart": -1,
            "results": [{ "id": id('c'), "created": 30 }],
        })))
        .mount(&server)
        .await;

    let client = PortalClient::new(&server.uri(), None).unwrap();
    let window = SearchWindow::until_now("jdoe", 0);

    let all = enumerate_roots(&client, &window, None).await.unwrap();
    assert_eq!(all, vec![item_id('a'), item_id('b'), item_id('c')]);

    let limited = enumerate_roots(&client, &window, Some(2)).await.unwrap();
    assert_eq!(limited, vec![item_id('a'), item_id('b')]);
}

#[tokio::test]
async fn test_search_window_restarts_past_result_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sharing/rest/search"))
        .and(query_param("start", "1"))
        .and(QueryContains::new("q", "created:[1000 TO"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 20000, "start": 1, "num": 2, "nextStart": 10001,
            "results": [{ "id": id('a'), "created": 1500 }, { "id": id('b'), "created": 1600 }],
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sharing/rest/search"))
        .and(query_param("start", "1"))
        .and(QueryContains::new("q", "created:[1601 TO"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2, "start": 1, "num": 2, "nextStart": -1,
            "results": [{ "id": id('b'), "created": 1600 }, { "id": id('c'), "created": 1700 }],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PortalClient::new(&server.uri(), None).unwrap();
    let found = enumerate_roots(&client, &SearchWindow::until_now("jdoe", 1000), None)
        .await
        .unwrap();

    assert_eq!(found, vec![item_id('a'), item_id('b'), item_id('c')]);
}

#[tokio::test]
async fn test_resolve_roots_precedence() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sharing/rest/community/self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "jdoe" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sharing/rest/search"))
        .and(QueryContains::new("q", "owner:jdoe AND created:["))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1, "start": 1, "num": 1, "nextStart": -1,
            "results": [{ "id": id('s'), "created": 1 }],
        })))
        .mount(&server)
        .await;

    let client = PortalClient::new(&server.uri(), None).unwrap();
    let mut search = SearchConfig {
        roots: vec![id('c')],
        ..SearchConfig::default()
    };

    let roots = resolve_roots(&client, &search, vec![item_id('o')]).await.unwrap();
    assert_eq!(roots, vec![item_id('o')]);

    let roots = resolve_roots(&client, &search, vec![]).await.unwrap();
    assert_eq!(roots, vec![item_id('c')]);

    search.roots.clear();
    let roots = resolve_roots(&client, &search, vec![]).await.unwrap();
    assert_eq!(roots, vec![item_id('s')]);
}

#[tokio::test]
async fn test_empty_search_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sharing/rest/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 0, "start": 0, "num": 0, "nextStart": -1, "results": [],
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[portal]
url = "{}"

[search]
owner = "jdoe"

[output]
related-items-path = "related.csv"
missed-items-path = "missed.csv"
"#,
            server.uri()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    let result = run_crawl(&config, vec![]).await;

    assert!(matches!(result, Err(CrawlError::NoRoots(_))));
}

#[tokio::test]
async fn test_crawl_from_config_writes_reports() {
    let server = MockServer::start().await;
    mount_diamond(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let out = |name: &str| dir.path().join(name).display().to_string();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[portal]
url = "{url}"

[search]
roots = ["{root}"]

[crawler]
fetch-attempts = 1
retry-delay-ms = 1

[output]
related-items-path = "{related}"
missed-items-path = "{missed}"
summary-path = "{summary}"
graph-path = "{graph}"
"#,
            url = server.uri(),
            root = id('r'),
            related = out("related.csv"),
            missed = out("missed.csv"),
            summary = out("summary.md"),
            graph = out("graph.html"),
        ),
    )
    .unwrap();

    let config = load_config(&config_path).expect("Failed to load config");
    let report = run_crawl(&config, vec![]).await.expect("Crawl failed");
    assert_eq!(report.edges.len(), 6);

    let summary = generate_summary(&report, "hash", &config.portal.url);
    let writers = report_writers(&config.output, &config.portal.url, true);
    write_reports(&writers, &report, &summary).expect("Failed to write reports");

    let related = std::fs::read_to_string(dir.path().join("related.csv")).unwrap();
    let lines: Vec<&str> = related.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines[0].starts_with("Organization Item,"));
    assert!(lines[5].ends_with(",paused"));
    assert!(lines[6].ends_with(",reconciled"));

    let missed = std::fs::read_to_string(dir.path().join("missed.csv")).unwrap();
    assert_eq!(missed, "Item Id,Item Title,Item Owner,Error Message\n");

    let markdown = std::fs::read_to_string(dir.path().join("summary.md")).unwrap();
    assert!(markdown.contains("| Paused | 1 "));
    assert!(markdown.contains("| Reconciled | 1 |"));

    let html = std::fs::read_to_string(dir.path().join("graph.html")).unwrap();
    for c in "rabcd".chars() {
        assert!(html.contains(&id(c)), "graph is missing item {}", c);
    }
}
