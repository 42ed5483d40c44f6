//! Request/response hooks run by `Session`.
//!
//! # Design
//! Three stages, each an ordered list of trait objects on the session:
//!
//! - `RequestHook` sees the editable `Request` before preparation.
//! - `PreparedRequestHook` sees the final `HttpRequest`.
//! - `ResponseHook` sees the `Response` after the host returned it.
//!
//! Every hook takes its input by value and returns the (possibly replaced)
//! value for the next hook.

use std::sync::Arc;

use crate::client::Response;
use crate::convert::Converter;
use crate::http::{HttpRequest, Request};

pub trait RequestHook: Send + Sync {
    fn run(&self, request: Request) -> Request;
}

pub trait PreparedRequestHook: Send + Sync {
    fn run(&self, request: HttpRequest) -> HttpRequest;
}

pub trait ResponseHook: Send + Sync {
    fn run(&self, response: Response) -> Response;
}

/// A hook for any stage, as accepted by `Session::add_hook`.
pub enum SessionHook {
    Request(Box<dyn RequestHook>),
    PreparedRequest(Box<dyn PreparedRequestHook>),
    Response(Box<dyn ResponseHook>),
}

impl SessionHook {
    pub fn request(hook: impl RequestHook + 'static) -> Self {
        SessionHook::Request(Box::new(hook))
    }

    pub fn prepared_request(hook: impl PreparedRequestHook + 'static) -> Self {
        SessionHook::PreparedRequest(Box::new(hook))
    }

    pub fn response(hook: impl ResponseHook + 'static) -> Self {
        SessionHook::Response(Box::new(hook))
    }
}

/// Level used by the logging hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
}

fn emit(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => tracing::debug!("{message}"),
        LogLevel::Info => tracing::info!("{message}"),
    }
}

/// Logs `Request {method} {url} {payload}` before preparation.
#[derive(Debug, Clone, Copy)]
pub struct RequestLoggingHook {
    level: LogLevel,
}

impl RequestLoggingHook {
    pub fn debug() -> Self {
        Self { level: LogLevel::Debug }
    }

    pub fn info() -> Self {
        Self { level: LogLevel::Info }
    }
}

impl RequestHook for RequestLoggingHook {
    fn run(&self, request: Request) -> Request {
        let payload = match (&request.data, &request.json, &request.body) {
            (Some(data), _, _) => format!("{data:?}"),
            (None, Some(json), _) => json.to_string(),
            (None, None, Some(body)) => body.clone(),
            (None, None, None) => String::new(),
        };
        emit(self.level, &format!("Request {} {} {}", request.method, request.url, payload));
        request
    }
}

/// Logs `Request {method} {url} {body}` after preparation.
#[derive(Debug, Clone, Copy)]
pub struct PreparedRequestLoggingHook {
    level: LogLevel,
}

impl PreparedRequestLoggingHook {
    pub fn debug() -> Self {
        Self { level: LogLevel::Debug }
    }

    pub fn info() -> Self {
        Self { level: LogLevel::Info }
    }
}

impl PreparedRequestHook for PreparedRequestLoggingHook {
    fn run(&self, request: HttpRequest) -> HttpRequest {
        let body = request.body.as_deref().unwrap_or_default();
        emit(self.level, &format!("Request {} {} {}", request.method, request.url, body));
        request
    }
}

/// Logs `Response {status} {method} {url} {body}`.
#[derive(Debug, Clone, Copy)]
pub struct ResponseLoggingHook {
    level: LogLevel,
}

impl ResponseLoggingHook {
    pub fn debug() -> Self {
        Self { level: LogLevel::Debug }
    }

    pub fn info() -> Self {
        Self { level: LogLevel::Info }
    }
}

impl ResponseHook for ResponseLoggingHook {
    fn run(&self, response: Response) -> Response {
        emit(
            self.level,
            &format!(
                "Response {} {} {} {}",
                response.status, response.method, response.url, response.body
            ),
        );
        response
    }
}

/// Moves a structured `data` payload into `json` using a converter.
#[derive(Debug, Clone, Default)]
pub struct RequestConverterHook {
    converter: Arc<Converter>,
}

impl RequestConverterHook {
    pub fn new(converter: Arc<Converter>) -> Self {
        Self { converter }
    }
}

impl RequestHook for RequestConverterHook {
    fn run(&self, mut request: Request) -> Request {
        if let Some(data) = request.data.take() {
            request.json = Some(self.converter.unstructure(&data));
        }
        request
    }
}

impl From<RequestLoggingHook> for SessionHook {
    fn from(hook: RequestLoggingHook) -> Self {
        SessionHook::request(hook)
    }
}

impl From<PreparedRequestLoggingHook> for SessionHook {
    fn from(hook: PreparedRequestLoggingHook) -> Self {
        SessionHook::prepared_request(hook)
    }
}

impl From<ResponseLoggingHook> for SessionHook {
    fn from(hook: ResponseLoggingHook) -> Self {
        SessionHook::response(hook)
    }
}

impl From<RequestConverterHook> for SessionHook {
    fn from(hook: RequestConverterHook) -> Self {
        SessionHook::request(hook)
    }
}
