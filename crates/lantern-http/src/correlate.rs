//! Correlation middleware: request scopes and correlation identifiers.
//!
//! Two stages, installed so that [`open_context`] is the outermost layer:
//! the scope must exist before [`assign_request_id`] runs, and everything
//! further in, handlers included, then shares the same scope.
//!
//! ```rust,no_run
//! use axum::{Router, middleware, routing::get};
//! use lantern_http::{assign_request_id, open_context};
//!
//! async fn handler() -> &'static str {
//!     "ok"
//! }
//!
//! // Layers added last run first: `open_context` wraps everything.
//! let app: Router = Router::new()
//!     .route("/", get(handler))
//!     .layer(middleware::from_fn(assign_request_id))
//!     .layer(middleware::from_fn(open_context));
//! ```

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use lantern_telemetry::context;
use uuid::Uuid;

/// Open a fresh request context scope around the rest of the stack.
///
/// Every request gets its own scope; concurrent requests never observe
/// each other's values. The scope ends when the response is produced.
pub async fn open_context(request: Request, next: Next) -> Response {
    context::scope(next.run(request)).await
}

/// Assign a fresh UUID v4 correlation identifier to the active scope.
///
/// Identifier generation cannot fail, so this stage never short-circuits
/// a request. Outside a scope the assignment is a quiet no-op.
pub async fn assign_request_id(request: Request, next: Next) -> Response {
    context::set_request_id(Uuid::new_v4().to_string());
    next.run(request).await
}
