//! HTTP API test toolkit: hook pipeline, structured converter and typed
//! random-object generator.
//!
//! # Overview
//! - `Session` prepares `HttpRequest` values and wraps `HttpResponse` values
//!   without touching the network (host-does-IO pattern), running request,
//!   prepared-request and response hooks on the way.
//! - `Converter` maps `Value`s to JSON and back, directed by a `TypeDesc`.
//! - `Randomer` synthesizes `Value`s for a `TypeDesc`, fully or partially,
//!   from per-type hooks.
//!
//! # Design
//! - Types are described as data (`TypeDesc`) instead of reflected; Rust
//!   types opt in through `Describe`.
//! - A generated `Value` can be sent as a request payload through
//!   `RequestConverterHook` or deserialized into a serde type with
//!   `Converter::to_typed`.
//! - Every registry (generator hooks, structure hooks, session hooks) is
//!   owned by its instance.

pub mod client;
pub mod convert;
pub mod error;
pub mod hooks;
pub mod http;
pub mod logging;
pub mod random;
pub mod types;
pub mod value;

pub use client::{Response, Session, Transport};
pub use convert::Converter;
pub use error::{ApiError, ConvertError, RandomError};
pub use hooks::{
    LogLevel, PreparedRequestHook, PreparedRequestLoggingHook, RequestConverterHook, RequestHook,
    RequestLoggingHook, ResponseHook, ResponseLoggingHook, SessionHook,
};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Request};
pub use random::{Hook, HookParams, ObjectOptions, PartialOptions, Randomer};
pub use types::{Describe, Field, Primitive, RecordType, TypeDesc};
pub use value::{Params, Record, Value};
