//! Request-scoped context propagation.
//!
//! Values stored while handling one request are visible to every
//! asynchronous continuation of that request and never to concurrently
//! handled requests. Propagation rides on [`tokio::task_local!`], which
//! follows control flow across `.await` points rather than thread identity,
//! so a multiplexed runtime cannot leak values between requests.
//!
//! Outside a scope the store degrades instead of failing: [`set`] is a
//! no-op and [`get`] returns `None`.
//!
//! # Examples
//!
//! ```rust
//! use lantern_telemetry::context;
//! use serde_json::json;
//!
//! context::sync_scope(|| {
//!     context::set("tenant", json!("acme"));
//!     assert_eq!(context::get("tenant"), Some(json!("acme")));
//! });
//! assert_eq!(context::get("tenant"), None);
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use serde_json::Value;

/// Key under which the correlation identifier is stored.
pub const REQUEST_ID_KEY: &str = "requestId";

/// Shared key/value store backing one request scope.
///
/// Clones share storage, so the store handed to a scope remains visible to
/// every continuation the scope spawns.
#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl ContextStore {
    /// Empty store for a fresh request scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, key: &str, value: Value) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_owned(), value);
        }
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        self.values
            .read()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }
}

tokio::task_local! {
    static ACTIVE_STORE: ContextStore;
}

/// Run `fut` inside a fresh request scope.
///
/// Everything stored via [`set`] while the future runs, including from
/// tasks it spawns with the scope attached, is gone once the future
/// completes. Scopes nest; the innermost one wins.
pub async fn scope<F>(fut: F) -> F::Output
where
    F: Future,
{
    ACTIVE_STORE.scope(ContextStore::new(), fut).await
}

/// Run `f` inside a fresh request scope without entering the runtime.
///
/// Synchronous counterpart of [`scope`] for tests and non-async callers.
pub fn sync_scope<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    ACTIVE_STORE.sync_scope(ContextStore::new(), f)
}

/// Store a value in the active request scope.
///
/// Without an active scope this is a no-op.
pub fn set(key: &str, value: Value) {
    let _ = ACTIVE_STORE.try_with(|store| store.insert(key, value));
}

/// Read a value from the active request scope.
///
/// Returns `None` when the key is unset or no scope is active.
#[must_use]
pub fn get(key: &str) -> Option<Value> {
    ACTIVE_STORE
        .try_with(|store| store.lookup(key))
        .ok()
        .flatten()
}

/// Store the correlation identifier for the active request.
pub fn set_request_id(id: impl Into<String>) {
    set(REQUEST_ID_KEY, Value::String(id.into()));
}

/// Correlation identifier of the active request, if one was assigned.
#[must_use]
pub fn request_id() -> Option<String> {
    match get(REQUEST_ID_KEY) {
        Some(Value::String(id)) => Some(id),
        _ => None,
    }
}
