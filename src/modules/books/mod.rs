pub mod handlers;
pub mod models;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use tracker_kernel::{InitCtx, Module};

use handlers::SharedTracker;

/// Books module: book tracking endpoints under `/api/v1`
pub struct BooksModule {
    tracker: SharedTracker,
}

impl BooksModule {
    pub fn new(tracker: SharedTracker) -> Self {
        Self { tracker }
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
        handlers::router(Arc::clone(&self.tracker))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let envelope = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Envelope" }
                    }
                }
            })
        };
        let book_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Book" }
                }
            }
        });
        let book_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/BookResponse" }
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/book": {
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Books"],
                        "requestBody": book_body.clone(),
                        "responses": {
                            "200": envelope("Book created"),
                            "400": envelope("Invalid book"),
                            "500": envelope("Storage failure")
                        }
                    },
                    "put": {
                        "summary": "Update an existing book",
                        "tags": ["Books"],
                        "requestBody": book_body.clone(),
                        "responses": {
                            "200": envelope("Book updated"),
                            "400": envelope("Invalid book"),
                            "404": envelope("No book with this ISBN"),
                            "500": envelope("Storage failure")
                        }
                    },
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "sort",
                            "in": "query",
                            "required": false,
                            "schema": { "type": "string", "enum": ["title", "status", "genre"] }
                        }],
                        "responses": {
                            "200": book_response("Books in the requested order"),
                            "400": envelope("Invalid sort key"),
                            "500": envelope("Storage failure")
                        }
                    }
                },
                "/book/{id}": {
                    "get": {
                        "summary": "Get a book by ISBN",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": book_response("The book"),
                            "404": envelope("No book with this ISBN"),
                            "500": envelope("Storage failure")
                        }
                    }
                },
                "/genre": {
                    "get": {
                        "summary": "Group books by genre",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Genres with their books",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/GenreResponse" }
                                    }
                                }
                            },
                            "500": envelope("Storage failure")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "isbn": { "type": "string" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "genre": { "type": "string" },
                            "status": {
                                "type": "string",
                                "enum": ["UNREAD", "IN PROGRESS", "FINISHED"]
                            },
                            "bookmark": { "type": "integer" },
                            "created": { "type": "integer", "description": "Epoch seconds" },
                            "updated": { "type": "integer", "description": "Epoch seconds" },
                            "created_by": { "type": "string" },
                            "updated_by": { "type": "string" },
                            "started": { "type": "integer", "description": "Epoch seconds" },
                            "finished": { "type": "integer", "description": "Epoch seconds" },
                            "active": { "type": "string" }
                        },
                        "required": ["isbn", "title", "author", "genre"]
                    },
                    "BookResponse": {
                        "allOf": [
                            { "$ref": "#/components/schemas/Envelope" },
                            {
                                "type": "object",
                                "properties": {
                                    "book": { "$ref": "#/components/schemas/Book" },
                                    "books": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    },
                                    "count": { "type": "integer" }
                                }
                            }
                        ]
                    },
                    "GenreResponse": {
                        "allOf": [
                            { "$ref": "#/components/schemas/Envelope" },
                            {
                                "type": "object",
                                "properties": {
                                    "genres": {
                                        "type": "array",
                                        "items": {
                                            "type": "object",
                                            "properties": {
                                                "genre": { "type": "string" },
                                                "count": { "type": "integer" },
                                                "books": {
                                                    "type": "array",
                                                    "items": { "$ref": "#/components/schemas/Book" }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        ]
                    }
                }
            }
        }))
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

/// Create the books module around `tracker`
pub fn create_module(tracker: SharedTracker) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(tracker))
}
