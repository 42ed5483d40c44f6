//! Error types for the session, the converter and the random generator.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other status mismatches land in `HttpError` with the raw
//! status code and body for debugging.
//!
//! Generation and conversion errors live in their own enums. An unsupported
//! type met during generation is not an error at all: it yields
//! `Value::Null`.

use crate::types::TypeDesc;

/// Errors returned by `Session` and `Response` methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status other than the expected one.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The host transport failed before a response was produced.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request URL or query could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// Schema-directed structuring of the response body failed.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Errors returned by `Randomer`.
#[derive(Debug, thiserror::Error)]
pub enum RandomError {
    /// No generator is registered for this exact type.
    #[error("no generator registered for type {0}")]
    HookNotFound(TypeDesc),

    /// `only` and `ignore` were both supplied.
    #[error("only one of `only` or `ignore` may be used")]
    ConflictingFilters,

    /// The generated value could not be turned into the requested Rust type.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Errors returned by `Converter`.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The JSON shape does not match the target type.
    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A record could not be built from the JSON object's keys.
    #[error(
        "got mismatched parameters for {record}, first level:\n\texpected: {expected:?}\n\tactual: {actual:?}\n\nmissing field: {missing}"
    )]
    MismatchedFields {
        record: String,
        expected: Vec<String>,
        actual: Vec<String>,
        missing: String,
    },

    /// No alternative of a union accepted the value.
    #[error("no alternative of {0} matched")]
    NoAlternative(TypeDesc),

    /// The target type cannot be structured without a registered hook.
    #[error("no structure hook for type {0}")]
    Unsupported(TypeDesc),

    /// serde could not map the unstructured value onto a Rust type.
    #[error("deserialization failed: {0}")]
    Deserialize(#[from] serde_json::Error),
}
