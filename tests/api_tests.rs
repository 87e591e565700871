//! Endpoint tests for the shelf HTTP API

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use shelf_kernel::{settings::Settings, ModuleRegistry};
use shelf_notion::{
    CredentialSource, Credentials, DatabaseQuery, NotionError, QueryResponse, StaticCredentials,
};

/// Database that serves `page_sizes.len()` pages and can fail on one of them.
struct FakeNotion {
    page_sizes: Vec<usize>,
    fail_on_page: Option<(usize, u16)>,
    calls: AtomicUsize,
}

impl FakeNotion {
    fn new(page_sizes: Vec<usize>) -> Arc<Self> {
        Arc::new(Self {
            page_sizes,
            fail_on_page: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(page_sizes: Vec<usize>, page: usize, status: u16) -> Arc<Self> {
        Arc::new(Self {
            page_sizes,
            fail_on_page: Some((page, status)),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseQuery for FakeNotion {
    async fn query_page(
        &self,
        _credentials: &Credentials,
        cursor: Option<&str>,
    ) -> Result<QueryResponse, NotionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let page = cursor.map_or(0, |c| c.parse::<usize>().unwrap());

        if let Some((failing, status)) = self.fail_on_page {
            if failing == page {
                return Err(NotionError::Status {
                    status,
                    body: r#"{"object":"error","message":"rate limited"}"#.to_string(),
                });
            }
        }

        let results: Vec<Value> = (0..self.page_sizes[page])
            .map(|i| {
                json!({
                    "id": format!("p{page}-{i}"),
                    "properties": {
                        "Name": {"type": "title", "title": [{"plain_text": format!("Book {page}.{i}")}]},
                        "Copies": {"type": "number", "number": 2}
                    }
                })
            })
            .collect();
        let has_more = page + 1 < self.page_sizes.len();
        let next_cursor = has_more.then(|| (page + 1).to_string());

        Ok(serde_json::from_value(json!({
            "results": results,
            "has_more": has_more,
            "next_cursor": next_cursor
        }))?)
    }
}

/// Database whose every call takes longer than the request budget.
struct SlowNotion;

#[async_trait]
impl DatabaseQuery for SlowNotion {
    async fn query_page(
        &self,
        _credentials: &Credentials,
        _cursor: Option<&str>,
    ) -> Result<QueryResponse, NotionError> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(QueryResponse::default())
    }
}

/// Database that answers 200 with a body that is not a query result.
struct GarbledNotion;

#[async_trait]
impl DatabaseQuery for GarbledNotion {
    async fn query_page(
        &self,
        _credentials: &Credentials,
        _cursor: Option<&str>,
    ) -> Result<QueryResponse, NotionError> {
        Ok(serde_json::from_str("<html>maintenance</html>")?)
    }
}

fn server(source: Arc<dyn DatabaseQuery>, credentials: StaticCredentials) -> TestServer {
    server_with_settings(source, credentials, &Settings::default())
}

fn server_with_settings(
    source: Arc<dyn DatabaseQuery>,
    credentials: StaticCredentials,
    settings: &Settings,
) -> TestServer {
    let credentials: Arc<dyn CredentialSource> = Arc::new(credentials);
    let mut registry = ModuleRegistry::new();
    shelf_app::register_with(&mut registry, source, credentials).unwrap();

    let app = shelf_http::build_router(&registry, settings);
    TestServer::new(app).expect("Failed to create test server")
}

fn configured() -> StaticCredentials {
    StaticCredentials::new("secret_test", "db42")
}

#[tokio::test]
async fn test_books_returns_every_page_in_order() {
    let notion = FakeNotion::new(vec![100, 100, 7]);
    let server = server(notion.clone(), configured());

    let response = server.get("/api/notion-books").await;

    response.assert_status_ok();
    assert_eq!(
        response.header("cache-control"),
        "s-maxage=60, stale-while-revalidate=300"
    );

    let body: Value = response.json();
    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 207);
    assert_eq!(books[0]["id"], "p0-0");
    assert_eq!(books[0]["title"], "Book 0.0");
    assert_eq!(books[0]["copies"], 2);
    assert_eq!(books[100]["id"], "p1-0");
    assert_eq!(books[206]["id"], "p2-6");
    assert_eq!(notion.calls(), 3);
}

#[tokio::test]
async fn test_books_accepts_any_method() {
    let server = server(FakeNotion::new(vec![1]), configured());

    let response = server.post("/api/notion-books").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_books_empty_database() {
    let server = server(FakeNotion::new(vec![0]), configured());

    let response = server.get("/api/notion-books").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn test_books_missing_config_makes_no_calls() {
    let notion = FakeNotion::new(vec![5]);
    let server = server(notion.clone(), StaticCredentials::empty());

    let response = server.get("/api/notion-books").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing NOTION_SECRET and NOTION_DATABASE_ID");
    assert_eq!(body["missing"], json!(["NOTION_SECRET", "NOTION_DATABASE_ID"]));
    assert_eq!(notion.calls(), 0);
}

#[tokio::test]
async fn test_books_empty_database_id_is_missing() {
    let notion = FakeNotion::new(vec![5]);
    let server = server(notion.clone(), StaticCredentials::new("secret_test", ""));

    let response = server.get("/api/notion-books").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing NOTION_DATABASE_ID");
    assert_eq!(notion.calls(), 0);
}

#[tokio::test]
async fn test_books_upstream_failure_returns_no_partial_data() {
    let notion = FakeNotion::failing(vec![100, 100, 7], 1, 429);
    let server = server(notion.clone(), configured());

    let response = server.get("/api/notion-books").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body.is_object());
    assert_eq!(body["error"], "Notion query failed");
    assert_eq!(body["status"], 429);
    assert!(body["body"].as_str().unwrap().contains("rate limited"));
    assert!(response.text().contains("429"));
    assert_eq!(notion.calls(), 2);
}

#[tokio::test]
async fn test_books_undecodable_response_is_server_error() {
    let server = server(Arc::new(GarbledNotion), configured());

    let response = server.get("/api/notion-books").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body.is_object());
    assert_eq!(body["error"], "Server error");
    assert_eq!(body["code"], "internal_error");
    assert!(body.get("status").is_none());
}

#[tokio::test]
async fn test_books_slow_fetch_times_out_with_json_error() {
    let mut settings = Settings::default();
    settings.server.request_timeout_ms = 50;
    let server = server_with_settings(Arc::new(SlowNotion), configured(), &settings);

    let response = server.get("/api/notion-books").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Server error");
    assert_eq!(body["code"], "internal_error");
}

#[tokio::test]
async fn test_ping_without_config() {
    let server = server(FakeNotion::new(vec![0]), StaticCredentials::empty());

    let response = server.get("/api/ping").await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"ok": true, "hasSecret": false, "hasDb": false})
    );
}

#[tokio::test]
async fn test_ping_never_echoes_secret() {
    let server = server(FakeNotion::new(vec![0]), configured());

    let response = server.get("/api/ping").await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"ok": true, "hasSecret": true, "hasDb": true})
    );
    assert!(!response.text().contains("secret_test"));
}

#[tokio::test]
async fn test_healthz_and_unknown_route() {
    let server = server(FakeNotion::new(vec![0]), configured());

    server.get("/healthz").await.assert_text("ok");

    let response = server.get("/api/nope").await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["code"], "not_found");
}

#[tokio::test]
async fn test_openapi_lists_module_paths() {
    let server = server(FakeNotion::new(vec![0]), configured());

    let response = server.get("/docs/openapi.json").await;

    response.assert_status_ok();
    let document: Value = response.json();
    assert!(document["paths"]["/api/notion-books"].is_object());
    assert!(document["paths"]["/api/ping"].is_object());
    assert!(document["components"]["schemas"]["Book"].is_object());
}
