pub mod clock;
pub mod id;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::{json, Value};

use store::BookStore;

/// Books module: owns the in-memory catalogue and serves it under `/books`.
pub struct BooksModule {
    store: Arc<BookStore>,
}

impl BooksModule {
    pub fn new(store: Arc<BookStore>) -> Self {
        Self { store }
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
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            discarded = self.store.len(),
            "books module stopped"
        );
        Ok(())
    }
}

/// `{status: "success", data: {<key>: <schema>}}`
fn success_with_data(description: &str, key: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": {
                        "status": { "type": "string" },
                        "message": { "type": "string" },
                        "data": {
                            "type": "object",
                            "properties": { key: schema }
                        }
                    },
                    "required": ["status"]
                }
            }
        }
    })
}

fn with_schema(description: &str, schema_name: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema_name) }
            }
        }
    })
}

fn schemas() -> Value {
    let book = json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "name": { "type": "string" },
            "year": { "type": "integer" },
            "author": { "type": "string" },
            "summary": { "type": "string" },
            "publisher": { "type": "string" },
            "pageCount": { "type": "integer", "minimum": 0 },
            "readPage": { "type": "integer", "minimum": 0 },
            "finished": { "type": "boolean" },
            "reading": { "type": "boolean" },
            "insertedAt": { "type": "string", "format": "date-time" },
            "updatedAt": { "type": "string", "format": "date-time" }
        },
        "required": [
            "id", "name", "year", "author", "summary", "publisher",
            "pageCount", "readPage", "finished", "reading",
            "insertedAt", "updatedAt"
        ]
    });
    let payload = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "year": { "type": "integer" },
            "author": { "type": "string" },
            "summary": { "type": "string" },
            "publisher": { "type": "string" },
            "pageCount": { "type": "integer", "minimum": 0 },
            "readPage": { "type": "integer", "minimum": 0 },
            "reading": { "type": "boolean" }
        }
    });
    let summary = json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "name": { "type": "string" },
            "publisher": { "type": "string" }
        },
        "required": ["id", "name", "publisher"]
    });
    let message = json!({
        "type": "object",
        "properties": {
            "status": { "type": "string" },
            "message": { "type": "string" }
        },
        "required": ["status", "message"]
    });

    json!({
        "Book": book,
        "BookPayload": payload,
        "BookSummary": summary,
        "MessageResponse": message
    })
}

/// OpenAPI paths and schemas for the books endpoints.
fn openapi_fragment() -> Value {
    let invalid = with_schema("Missing name or readPage above pageCount", "FailResponse");
    let missing = with_schema("Book not found", "FailResponse");
    let book_id = json!({
        "name": "bookId",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    });
    let payload = json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookPayload" }
            }
        }
    });

    let collection = json!({
        "post": {
            "summary": "Add a book",
            "tags": ["Books"],
            "requestBody": payload,
            "responses": {
                "201": success_with_data("Book added", "bookId", json!({ "type": "string" })),
                "400": invalid
            }
        },
        "get": {
            "summary": "List books",
            "tags": ["Books"],
            "responses": {
                "200": success_with_data(
                    "Summaries of every book",
                    "books",
                    json!({ "type": "array", "items": { "$ref": "#/components/schemas/BookSummary" } })
                )
            }
        }
    });

    let item = json!({
        "get": {
            "summary": "Get a book",
            "tags": ["Books"],
            "parameters": [book_id],
            "responses": {
                "200": success_with_data(
                    "The book",
                    "book",
                    json!({ "$ref": "#/components/schemas/Book" })
                ),
                "404": missing
            }
        },
        "put": {
            "summary": "Replace a book",
            "tags": ["Books"],
            "parameters": [book_id],
            "requestBody": payload,
            "responses": {
                "200": with_schema("Book updated", "MessageResponse"),
                "400": invalid,
                "404": missing
            }
        },
        "delete": {
            "summary": "Delete a book",
            "tags": ["Books"],
            "parameters": [book_id],
            "responses": {
                "200": with_schema("Book deleted", "MessageResponse"),
                "404": missing
            }
        }
    });

    json!({
        "paths": {
            "/books": collection,
            "/books/{bookId}": item
        },
        "components": {
            "schemas": schemas()
        }
    })
}

/// Create a books module backed by a fresh, empty store
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new(Arc::new(BookStore::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_every_operation() {
        let spec = BooksModule::new(Arc::new(BookStore::new()))
            .openapi()
            .unwrap();

        let collection = &spec["paths"]["/books"];
        assert!(collection["post"].is_object());
        assert!(collection["get"].is_object());

        let item = &spec["paths"]["/books/{bookId}"];
        for method in ["get", "put", "delete"] {
            assert!(item[method].is_object(), "missing {method}");
        }
        assert_eq!(
            item["delete"]["responses"]["404"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/FailResponse"
        );
    }
}
