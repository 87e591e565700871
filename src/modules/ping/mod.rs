use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, routing::any, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shelf_kernel::Module;
use shelf_notion::CredentialSource;

/// Reports whether the Notion credentials are configured, without revealing them
pub struct PingModule {
    credentials: Arc<dyn CredentialSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub ok: bool,
    pub has_secret: bool,
    pub has_db: bool,
}

impl PingResponse {
    pub fn from_source(credentials: &dyn CredentialSource) -> Self {
        let raw = credentials.load();
        Self {
            ok: true,
            has_secret: raw.has_secret(),
            has_db: raw.has_database_id(),
        }
    }
}

impl PingModule {
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl Module for PingModule {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", any(ping))
            .with_state(self.credentials.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Configuration health",
                        "tags": ["Health"],
                        "responses": {
                            "200": {
                                "description": "Presence of NOTION_SECRET and NOTION_DATABASE_ID",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Ping"}
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Ping": {
                        "type": "object",
                        "properties": {
                            "ok": {"type": "boolean"},
                            "hasSecret": {"type": "boolean"},
                            "hasDb": {"type": "boolean"}
                        },
                        "required": ["ok", "hasSecret", "hasDb"]
                    }
                }
            }
        }))
    }
}

async fn ping(State(credentials): State<Arc<dyn CredentialSource>>) -> Json<PingResponse> {
    Json(PingResponse::from_source(credentials.as_ref()))
}

/// Create the ping module
pub fn create_module(credentials: Arc<dyn CredentialSource>) -> Arc<dyn Module> {
    Arc::new(PingModule::new(credentials))
}
