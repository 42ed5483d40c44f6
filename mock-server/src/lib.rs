use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the echo endpoints send back.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub url: String,
    pub args: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub json: Option<serde_json::Value>,
}

/// Fixed payload served by `/json`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub title: String,
    pub count: i64,
    pub tags: Vec<String>,
    pub owner: Option<String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/get", get(echo_get))
        .route("/post", post(echo_body))
        .route("/put", put(echo_body))
        .route("/patch", patch(echo_body))
        .route("/delete", delete(echo_body))
        .route("/status/{code}", get(status).post(status))
        .route("/json", get(sample))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect()
}

async fn echo_get(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(args): Query<BTreeMap<String, String>>,
) -> Json<Echo> {
    Json(Echo {
        method: method.to_string(),
        url: uri.to_string(),
        args,
        headers: header_map(&headers),
        data: String::new(),
        json: None,
    })
}

async fn echo_body(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(args): Query<BTreeMap<String, String>>,
    body: String,
) -> Json<Echo> {
    tracing::debug!(%uri, len = body.len(), "echoing request body");
    Json(Echo {
        method: method.to_string(),
        url: uri.to_string(),
        args,
        headers: header_map(&headers),
        json: serde_json::from_str(&body).ok(),
        data: body,
    })
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn sample() -> Json<Sample> {
    Json(Sample {
        title: "Sample".to_string(),
        count: 3,
        tags: vec!["a".to_string(), "b".to_string()],
        owner: None,
    })
}
