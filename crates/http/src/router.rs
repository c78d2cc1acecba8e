//! Router builder for the HTTP server

use axum::{extract::Request, http::HeaderValue, routing::get, Json, Router};
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{NoContext, Timestamp, Uuid};

use tracker_kernel::ModuleRegistry;

use crate::response::Envelope;

/// Prefix every module route is mounted under
pub const API_PREFIX: &str = "/api/v1";

/// Builder for the service router.
///
/// Middleware is recorded and applied in [`RouterBuilder::build`] so that it
/// wraps every route regardless of the order the builder is called in.
pub struct RouterBuilder {
    root: Router,
    api: Router,
    tracing: bool,
    cors: bool,
    request_id: bool,
    timeout: Option<Duration>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            root: Router::new(),
            api: Router::new(),
            tracing: false,
            cors: false,
            request_id: false,
            timeout: None,
        }
    }

    /// Merge a module's routes under [`API_PREFIX`]
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        tracing::info!(
            module = module_name,
            "mounting module routes under {}",
            API_PREFIX
        );
        self.api = self.api.merge(module_router);
        self
    }

    /// Add the liveness probe at `/api/v1/probes/liveness`
    pub fn with_probes(mut self) -> Self {
        self.api = self.api.route("/probes/liveness", get(liveness));
        self
    }

    pub fn with_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    pub fn with_cors(mut self) -> Self {
        self.cors = true;
        self
    }

    /// Tag requests with a UUIDv7 `x-request-id` and echo it on the response
    pub fn with_request_id(mut self) -> Self {
        self.request_id = true;
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(Duration::from_millis(timeout_ms));
        self
    }

    /// Serve the merged OpenAPI document of all modules at `/api/v1/openapi`
    /// and a Swagger UI over it at `/swagger-ui`
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let document = openapi_document(registry);

        let openapi = parse_openapi(&document).unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                "merged OpenAPI document is invalid; serving a bare one"
            );
            utoipa::openapi::OpenApiBuilder::new()
                .info(
                    utoipa::openapi::InfoBuilder::new()
                        .title("Book Tracker API")
                        .version("1.0.0")
                        .build(),
                )
                .build()
        });

        self.root = self.root.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi),
        );
        self.api = self.api.route(
            "/openapi",
            get(move || async move { Json(document.clone()) }),
        );
        self
    }

    pub fn build(self) -> Router {
        let mut router = self.root.nest(API_PREFIX, self.api);

        if let Some(timeout) = self.timeout {
            router = router.layer(TimeoutLayer::new(timeout));
        }
        if self.cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }
        if self.tracing {
            router = router.layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                    .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
            );
        }
        if self.request_id {
            // Outermost, so the id is set before the trace span is created.
            router = router
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        }

        router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge the OpenAPI fragments of every module, prefixing their paths
pub fn openapi_document(registry: &ModuleRegistry) -> Value {
    let mut document = json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Book Tracker API",
            "version": "1.0.0",
            "description": "Track books, reading progress and genres"
        },
        "paths": {},
        "components": {
            "schemas": {
                "Envelope": {
                    "type": "object",
                    "properties": {
                        "code": { "type": "integer" },
                        "status": { "type": "string" },
                        "message": { "type": "string" }
                    },
                    "required": ["code", "status", "message"]
                }
            }
        }
    });

    document["paths"][format!("{API_PREFIX}/probes/liveness")] = json!({
        "get": {
            "summary": "Liveness probe",
            "responses": {
                "200": {
                    "description": "Service is alive",
                    "content": {
                        "application/json": {
                            "schema": { "$ref": "#/components/schemas/Envelope" }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };

        if let Some(paths) = fragment.get("paths").and_then(Value::as_object) {
            for (path, item) in paths {
                document["paths"][format!("{API_PREFIX}{path}")] = item.clone();
            }
        }

        if let Some(schemas) = fragment
            .pointer("/components/schemas")
            .and_then(Value::as_object)
        {
            for (name, schema) in schemas {
                document["components"]["schemas"][name] = schema.clone();
            }
        }
    }

    document
}

/// Typed view of a merged document, as handed to the Swagger UI
pub fn parse_openapi(document: &Value) -> Result<utoipa::openapi::OpenApi, serde_json::Error> {
    serde_json::from_value(document.clone())
}

async fn liveness() -> Json<Envelope> {
    Json(Envelope::ok("alive"))
}

/// Request id generator producing time-ordered UUIDs
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = Uuid::new_v7(Timestamp::now(NoContext))
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
