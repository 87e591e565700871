pub mod models;
pub mod normalize;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::json;
use shelf_http::AppError;
use shelf_kernel::{InitCtx, Module};
use shelf_notion::{query_all, CredentialSource, Credentials, DatabaseQuery, NotionError};

use models::Book;

/// Shared caches may serve a response for a minute, and a stale copy for
/// five more while revalidating.
pub const CACHE_CONTROL: &str = "s-maxage=60, stale-while-revalidate=300";

/// Serves the normalized catalog at `/api/notion-books`
pub struct BooksModule {
    state: BooksState,
}

#[derive(Clone)]
struct BooksState {
    source: Arc<dyn DatabaseQuery>,
    credentials: Arc<dyn CredentialSource>,
}

impl BooksModule {
    pub fn new(source: Arc<dyn DatabaseQuery>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            state: BooksState {
                source,
                credentials,
            },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "notion-books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let raw = self.state.credentials.load();
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            has_secret = raw.has_secret(),
            has_db = raw.has_database_id(),
            "books module initialized"
        );
        if !raw.has_secret() || !raw.has_database_id() {
            tracing::warn!(
                module = self.name(),
                "Notion credentials incomplete; catalog requests will fail until they are set"
            );
        }
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", any(list_books))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List catalog books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Every row of the Notion database, in database order",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": {"$ref": "#/components/schemas/Book"}
                                        }
                                    }
                                }
                            },
                            "500": {
                                "description": "Missing configuration or Notion query failure",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "title": {"type": "string"},
                            "author": {"type": "string"},
                            "type": {"type": "string"},
                            "ageRange": {"type": "string"},
                            "description": {"type": "string"},
                            "image": {"type": "string"},
                            "copies": {"type": "integer", "minimum": 1},
                            "rented": {"type": "boolean"},
                            "rentedCount": {"type": "integer", "minimum": 0},
                            "mrp": {"type": "number", "minimum": 0},
                            "rent": {"type": "number", "minimum": 0}
                        },
                        "required": [
                            "id", "title", "author", "type", "ageRange", "description",
                            "image", "copies", "rented", "rentedCount", "mrp", "rent"
                        ]
                    }
                }
            }
        }))
    }
}

/// Fetch every row of the database and normalize it, keeping database order.
pub async fn fetch_catalog(
    source: &dyn DatabaseQuery,
    credentials: &Credentials,
) -> Result<Vec<Book>, NotionError> {
    let pages = query_all(source, credentials).await?;
    Ok(pages.iter().map(normalize::normalize_page).collect())
}

/// Convert a query failure into its HTTP error
pub fn fetch_error(err: NotionError) -> AppError {
    match err {
        NotionError::Status { status, body } => {
            AppError::upstream("Notion query failed", status, body)
        }
        other => AppError::Internal(other.into()),
    }
}

async fn list_books(State(state): State<BooksState>) -> Result<Response, AppError> {
    let credentials = state.credentials.load().require().map_err(|err| {
        let missing = err.missing().to_vec();
        AppError::configuration(err.to_string(), missing)
    })?;

    let books = fetch_catalog(state.source.as_ref(), &credentials)
        .await
        .map_err(fetch_error)?;

    tracing::debug!(books = books.len(), "serving catalog");

    Ok(([(header::CACHE_CONTROL, CACHE_CONTROL)], Json(books)).into_response())
}

/// Create the books module backed by the given Notion source
pub fn create_module(
    source: Arc<dyn DatabaseQuery>,
    credentials: Arc<dyn CredentialSource>,
) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(source, credentials))
}
