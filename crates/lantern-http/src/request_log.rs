//! Request-logging middleware.
//!
//! Emits one `http`-level entry per handled request, carrying the method
//! and URL in the message plus sanitized request/response metadata in the
//! fields. Runs inside the correlation scope, so every entry picks up the
//! request identifier like any other log line.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use colored::{Color, Colorize};
use http::{Method, StatusCode, Uri};
use http_body_util::BodyExt;
use lantern_telemetry::{Level, Logger};
use serde_json::{Map, Value};
use tower::{Layer, Service};

use crate::redact;

/// Message template: `{method}` and `{url}` are substituted per request.
const DEFAULT_MESSAGE_TEMPLATE: &str = "{method} {url}";

/// Request metadata fields captured when `meta` is enabled.
const REQUEST_FIELDS: [&str; 4] = ["method", "url", "query", "headers"];

/// Response metadata fields captured when `meta` is enabled.
const RESPONSE_FIELDS: [&str; 2] = ["statusCode", "body"];

type IgnorePredicate = dyn Fn(&Method, &Uri) -> bool + Send + Sync;

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

/// Configuration for the request-logging middleware.
///
/// Built with defaults that match the correlation stack: metadata on,
/// `{method} {url}` messages, colour only in development, no response
/// body capture and nothing ignored. Builder methods override defaults
/// one at a time; [`RequestLogging::layer`] freezes the result.
#[derive(Clone)]
pub struct RequestLogging {
    logger: Logger,
    meta: bool,
    message_template: String,
    colorize: bool,
    log_response_body: bool,
    body_blacklist: Vec<String>,
    header_blacklist: Vec<String>,
    ignore_route: Arc<IgnorePredicate>,
}

impl RequestLogging {
    /// Middleware configuration emitting through `logger`.
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        let colorize = logger.environment().is_development();
        Self {
            logger,
            meta: true,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_owned(),
            colorize,
            log_response_body: false,
            body_blacklist: Vec::new(),
            header_blacklist: Vec::new(),
            ignore_route: Arc::new(|_, _| false),
        }
    }

    /// Attach request/response metadata to each entry (default `true`).
    #[must_use]
    pub fn with_meta(mut self, meta: bool) -> Self {
        self.meta = meta;
        self
    }

    /// Override the message template. `{method}` and `{url}` are
    /// substituted per request.
    #[must_use]
    pub fn with_message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    /// Colour the message by status class (default: development only).
    #[must_use]
    pub fn with_colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    /// Capture JSON response bodies into the metadata.
    ///
    /// The full response is buffered in memory before it is sent, so only
    /// enable this on routes with bounded bodies. The client still
    /// receives the unredacted body.
    #[must_use]
    pub fn with_response_body(mut self, capture: bool) -> Self {
        self.log_response_body = capture;
        self
    }

    /// Body keys to overwrite with `REDACTED` in captured response
    /// bodies.
    #[must_use]
    pub fn with_body_blacklist<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.body_blacklist = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Header names to drop entirely from captured request metadata.
    #[must_use]
    pub fn with_header_blacklist<I, K>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.header_blacklist = names.into_iter().map(Into::into).collect();
        self
    }

    /// Skip logging for requests the predicate matches.
    #[must_use]
    pub fn with_ignore_route<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Method, &Uri) -> bool + Send + Sync + 'static,
    {
        self.ignore_route = Arc::new(predicate);
        self
    }

    /// Freeze the configuration into a tower [`Layer`].
    #[must_use]
    pub fn layer(self) -> RequestLoggingLayer {
        RequestLoggingLayer {
            options: Arc::new(self),
        }
    }

    fn render_message(&self, method: &Method, uri: &Uri, status: StatusCode) -> String {
        let message = self
            .message_template
            .replace("{method}", method.as_str())
            .replace("{url}", &uri.to_string());
        if !self.colorize {
            return message;
        }
        let color = if status.is_server_error() {
            Color::Red
        } else if status.is_client_error() {
            Color::Yellow
        } else {
            Color::Green
        };
        message.color(color).to_string()
    }
}

/// Tower layer wrapping services in [`RequestLoggingService`].
#[derive(Clone)]
pub struct RequestLoggingLayer {
    options: Arc<RequestLogging>,
}

impl<S> Layer<S> for RequestLoggingLayer {
    type Service = RequestLoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLoggingService {
            inner,
            options: Arc::clone(&self.options),
        }
    }
}

/// Service wrapper that emits one `http`-level entry per request.
#[derive(Clone)]
pub struct RequestLoggingService<S> {
    inner: S,
    options: Arc<RequestLogging>,
}

impl<S> Service<Request> for RequestLoggingService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Response, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let options = Arc::clone(&self.options);
        let started = Instant::now();
        let method = request.method().clone();
        let uri = request.uri().clone();
        let ignored = (options.ignore_route)(&method, &uri);
        let request_meta = (options.meta && !ignored)
            .then(|| capture_request(&request, &options.header_blacklist));

        let future = self.inner.call(request);

        Box::pin(async move {
            let response = future.await?;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            if ignored {
                return Ok(response);
            }

            let (response, body) = if options.log_response_body {
                buffer_body(response).await
            } else {
                (response, None)
            };
            let status = response.status();

            let mut fields = Map::new();
            if options.meta {
                let mut http_meta = Map::new();
                if let Some(request_meta) = request_meta {
                    http_meta.insert("request".to_owned(), Value::Object(request_meta));
                }
                http_meta.insert(
                    "response".to_owned(),
                    Value::Object(capture_response(
                        status,
                        body.as_ref(),
                        &options.body_blacklist,
                    )),
                );
                http_meta.insert("responseTime".to_owned(), Value::from(elapsed_ms));
                fields.insert("http".to_owned(), Value::Object(http_meta));
            }

            let message = options.render_message(&method, &uri, status);
            options.logger.log_with(Level::Http, message, fields);

            Ok(response)
        })
    }
}

/// Capture request metadata and run it through the field sanitizer.
fn capture_request(request: &Request, header_blacklist: &[String]) -> Map<String, Value> {
    let mut raw = Map::new();
    raw.insert(
        "method".to_owned(),
        Value::String(request.method().as_str().to_owned()),
    );
    raw.insert("url".to_owned(), Value::String(request.uri().to_string()));
    if let Some(query) = request.uri().query() {
        raw.insert("query".to_owned(), Value::String(query.to_owned()));
    }

    let mut headers = Map::new();
    for (name, value) in request.headers() {
        let blocked = header_blacklist
            .iter()
            .any(|entry| entry.eq_ignore_ascii_case(name.as_str()));
        if blocked {
            continue;
        }
        headers.insert(
            name.as_str().to_owned(),
            Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        );
    }
    raw.insert("headers".to_owned(), Value::Object(headers));

    let mut sanitized = Map::new();
    for field in REQUEST_FIELDS {
        if let Some(value) = redact::sanitize_request_field(&raw, field) {
            sanitized.insert(field.to_owned(), value);
        }
    }
    sanitized
}

/// Capture response metadata and run it through the field sanitizer.
fn capture_response(
    status: StatusCode,
    body: Option<&Value>,
    blacklist: &[String],
) -> Map<String, Value> {
    let mut raw = Map::new();
    raw.insert("statusCode".to_owned(), Value::from(status.as_u16()));
    if let Some(body) = body {
        raw.insert("body".to_owned(), body.clone());
    }

    let mut sanitized = Map::new();
    for field in RESPONSE_FIELDS {
        if let Some(value) = redact::sanitize_response_field(&raw, field, blacklist) {
            sanitized.insert(field.to_owned(), value);
        }
    }
    sanitized
}

/// Buffer the response body, returning the rebuilt response and the body
/// parsed as JSON when it is JSON. A body that cannot be read is replaced
/// with an empty one.
async fn buffer_body(response: Response) -> (Response, Option<Value>) {
    let (parts, body) = response.into_parts();
    match body.collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            let value = serde_json::from_slice(&bytes).ok();
            (Response::from_parts(parts, Body::from(bytes)), value)
        },
        Err(_) => (Response::from_parts(parts, Body::empty()), None),
    }
}
