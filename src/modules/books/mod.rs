pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use shelf_authz::TokenService;
use shelf_kernel::{InitCtx, Migration, Module};

use store::BookStoreArc;

/// Book catalogue CRUD, gated by bearer tokens.
pub struct BooksModule {
    store: BookStoreArc,
    tokens: Arc<TokenService>,
}

impl BooksModule {
    pub fn new(store: BookStoreArc, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            store = ?self.store,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone(), self.tokens.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": {"type": "integer", "format": "int64", "minimum": 1}
        });
        let secured = json!([{"token": []}]);

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "security": secured,
                        "responses": {
                            "200": envelope("Books retrieved successfully", json!({
                                "type": "array",
                                "items": {"$ref": "#/components/schemas/Book"}
                            })),
                            "401": error("Missing or invalid token"),
                            "500": error("Failed to retrieve books")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": secured,
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/NewBook"}}}
                        },
                        "responses": {
                            "201": envelope("Book created successfully", json!({"$ref": "#/components/schemas/Book"})),
                            "400": error("Invalid request body"),
                            "401": error("Missing or invalid token"),
                            "500": error("Failed to create book")
                        }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": [id_param],
                        "responses": {
                            "200": envelope("Book retrieved successfully", json!({"$ref": "#/components/schemas/Book"})),
                            "401": error("Missing or invalid token"),
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "description": "Absent or null fields keep their stored value.",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": [id_param],
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/BookChanges"}}}
                        },
                        "responses": {
                            "200": envelope("Book updated successfully", json!({"$ref": "#/components/schemas/Book"})),
                            "400": error("Invalid request body"),
                            "401": error("Missing or invalid token"),
                            "404": error("Book not found"),
                            "500": error("Failed to update book")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": [id_param],
                        "responses": {
                            "200": error("Book deleted successfully"),
                            "401": error("Missing or invalid token"),
                            "404": error("Book not found"),
                            "500": error("Failed to delete book")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "integer", "format": "int64"},
                            "title": {"type": "string"},
                            "author": {"type": "string"},
                            "year": {"type": "integer", "format": "int32"}
                        },
                        "required": ["id", "title", "author", "year"]
                    },
                    "NewBook": {
                        "type": "object",
                        "properties": {
                            "title": {"type": "string"},
                            "author": {"type": "string"},
                            "year": {"type": "integer", "format": "int32"}
                        },
                        "description": "Missing fields default to \"\" or 0."
                    },
                    "BookChanges": {
                        "type": "object",
                        "properties": {
                            "title": {"type": ["string", "null"]},
                            "author": {"type": ["string", "null"]},
                            "year": {"type": ["integer", "null"], "format": "int32"}
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration::new(
            "001_create_books",
            r#"
            CREATE TABLE IF NOT EXISTS books (
                id     BIGSERIAL PRIMARY KEY,
                title  TEXT      NOT NULL,
                author TEXT      NOT NULL,
                year   INTEGER   NOT NULL
            );
            "#,
        )]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Success response whose envelope carries `data`.
fn envelope(description: &str, data: serde_json::Value) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "allOf": [
                        {"$ref": "#/components/schemas/Envelope"},
                        {"type": "object", "properties": {"data": data}}
                    ]
                }
            }
        }
    })
}

/// Response whose envelope has no `data`.
fn error(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {"schema": {"$ref": "#/components/schemas/Envelope"}}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::store::MemoryBookStore;
    use chrono::Duration;

    fn module() -> BooksModule {
        BooksModule::new(
            Arc::new(MemoryBookStore::new()),
            Arc::new(TokenService::new(b"secret", Duration::hours(72))),
        )
    }

    #[test]
    fn migration_creates_books_table() {
        let migrations = module().migrations();
        assert_eq!(migrations.len(), 1);
        assert_eq!(migrations[0].id, "001_create_books");
        assert!(migrations[0].up.contains("BIGSERIAL"));
    }

    #[test]
    fn openapi_describes_every_operation() {
        let doc = module().openapi().unwrap();
        for (path, method) in [
            ("/books", "get"),
            ("/books", "post"),
            ("/books/{id}", "get"),
            ("/books/{id}", "put"),
            ("/books/{id}", "delete"),
        ] {
            assert!(doc["paths"][path][method].is_object(), "{method} {path}");
        }
        assert!(doc["components"]["schemas"]["Book"].is_object());
    }
}
