//! Hook-running session: request preparation and response wrapping.
//!
//! # Design
//! `Session` holds a `base_url` and the three hook lists; it carries no
//! mutable state between calls. Each exchange is split into `prepare`
//! (produces an `HttpRequest`) and `finish` (consumes an `HttpResponse`).
//! The caller executes the actual HTTP round-trip in between, either by
//! hand or through a `Transport` passed to `send`.
//!
//! `Response` exposes the body as text, JSON, a serde type, or a `Value`
//! structured against a `TypeDesc`.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::convert::Converter;
use crate::error::ApiError;
use crate::hooks::{PreparedRequestHook, RequestHook, ResponseHook, SessionHook};
use crate::http::{find_header, HttpMethod, HttpRequest, HttpResponse, Request};
use crate::types::TypeDesc;
use crate::value::Value;

/// Executes prepared requests on behalf of a `Session`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, ApiError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}

/// A response after the response hooks ran, tagged with the request it
/// answers.
#[derive(Debug, Clone)]
pub struct Response {
    pub method: HttpMethod,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json(&self) -> Result<serde_json::Value, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Deserialize the body into `T`.
    pub fn structure<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Structure the JSON body as `ty`.
    pub fn structure_with(&self, converter: &Converter, ty: &TypeDesc) -> Result<Value, ApiError> {
        Ok(converter.structure(&self.json()?, ty)?)
    }

    /// Map a status other than `expected` to the appropriate `ApiError`.
    pub fn expect_status(&self, expected: u16) -> Result<&Self, ApiError> {
        check_status(self.status, &self.body, expected)?;
        Ok(self)
    }
}

/// Ordered hook pipeline around a base URL.
#[derive(Default)]
pub struct Session {
    base_url: String,
    request_hooks: Vec<Box<dyn RequestHook>>,
    prepared_request_hooks: Vec<Box<dyn PreparedRequestHook>>,
    response_hooks: Vec<Box<dyn ResponseHook>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("request_hooks", &self.request_hooks.len())
            .field("prepared_request_hooks", &self.prepared_request_hooks.len())
            .field("response_hooks", &self.response_hooks.len())
            .finish()
    }
}

impl Session {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn add_request_hook(&mut self, hook: impl RequestHook + 'static) {
        tracing::debug!("adding request hook");
        self.request_hooks.push(Box::new(hook));
    }

    pub fn add_prepared_request_hook(&mut self, hook: impl PreparedRequestHook + 'static) {
        tracing::debug!("adding prepared request hook");
        self.prepared_request_hooks.push(Box::new(hook));
    }

    pub fn add_response_hook(&mut self, hook: impl ResponseHook + 'static) {
        tracing::debug!("adding response hook");
        self.response_hooks.push(Box::new(hook));
    }

    /// Append a hook to the list of its stage.
    pub fn add_hook(&mut self, hook: impl Into<SessionHook>) {
        match hook.into() {
            SessionHook::Request(hook) => {
                tracing::debug!("adding request hook");
                self.request_hooks.push(hook);
            }
            SessionHook::PreparedRequest(hook) => {
                tracing::debug!("adding prepared request hook");
                self.prepared_request_hooks.push(hook);
            }
            SessionHook::Response(hook) => {
                tracing::debug!("adding response hook");
                self.response_hooks.push(hook);
            }
        }
    }

    pub fn hook_counts(&self) -> (usize, usize, usize) {
        (
            self.request_hooks.len(),
            self.prepared_request_hooks.len(),
            self.response_hooks.len(),
        )
    }

    /// Run request hooks, encode the request, then run prepared-request hooks.
    pub fn prepare(&self, request: Request) -> Result<HttpRequest, ApiError> {
        let request = self.request_hooks.iter().fold(request, |req, hook| hook.run(req));

        let mut url = self.resolve_url(&request.url);
        if !request.params.is_empty() {
            let query =
                serde_urlencoded::to_string(&request.params).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        let mut headers = request.headers;
        let body = match (request.data, request.json, request.body) {
            (Some(data), _, _) => {
                return Err(ApiError::SerializationError(format!(
                    "structured {} payload was not converted, add a RequestConverterHook",
                    data.kind()
                )));
            }
            (None, Some(json), _) => {
                if find_header(&headers, "content-type").is_none() {
                    headers.push(("content-type".to_string(), "application/json".to_string()));
                }
                Some(serde_json::to_string(&json).map_err(|e| ApiError::SerializationError(e.to_string()))?)
            }
            (None, None, body) => body,
        };

        let prepared = HttpRequest {
            method: request.method,
            url,
            headers,
            body,
        };
        Ok(self
            .prepared_request_hooks
            .iter()
            .fold(prepared, |req, hook| hook.run(req)))
    }

    /// Wrap the host's response and run response hooks over it.
    pub fn finish(&self, request: &HttpRequest, response: HttpResponse) -> Response {
        let response = Response {
            method: request.method,
            url: request.url.clone(),
            status: response.status,
            headers: response.headers,
            body: response.body,
        };
        self.response_hooks.iter().fold(response, |res, hook| hook.run(res))
    }

    /// `prepare`, execute through `transport`, then `finish`.
    pub fn send<T: Transport + ?Sized>(&self, transport: &T, request: Request) -> Result<Response, ApiError> {
        let prepared = self.prepare(request)?;
        let raw = transport.execute(&prepared)?;
        Ok(self.finish(&prepared, raw))
    }

    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") || self.base_url.is_empty() {
            return url.to_string();
        }
        format!("{}/{}", self.base_url, url.trim_start_matches('/'))
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(status: u16, body: &str, expected: u16) -> Result<(), ApiError> {
    if status == expected {
        return Ok(());
    }
    if status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status,
        body: body.to_string(),
    })
}
