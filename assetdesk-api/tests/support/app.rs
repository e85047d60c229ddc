//! Shared router harness for API integration tests.

use std::sync::Arc;

use assetdesk_api::{create_api_router, ApiConfig, AppState, GroupStore};
use assetdesk_core::{CatalogHandle, SearchDefaults};
use assetdesk_test_utils::fixtures::{linux_group, sample_catalog, sample_resolver};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

/// State over the sample catalog and inventory, seeded with the Linux group.
pub fn test_state() -> AppState {
    AppState::new(
        CatalogHandle::new(sample_catalog()),
        Arc::new(sample_resolver()),
        SearchDefaults::default(),
    )
    .with_groups(GroupStore::with_groups([linux_group()]))
}

pub fn test_app() -> Router {
    create_api_router(test_state(), &ApiConfig::default())
}

/// Decoded response: status, `Location` header and JSON body (or `Null`).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: serde_json::Value,
}

impl TestResponse {
    /// Ids of the `rows` array of a list response.
    pub fn row_ids(&self) -> Vec<i64> {
        self.body["rows"]
            .as_array()
            .map(|rows| rows.iter().filter_map(|row| row["id"].as_i64()).collect())
            .unwrap_or_default()
    }

    pub fn strings(&self, field: &str) -> Vec<String> {
        self.body[field]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Result<TestResponse, String> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let request = builder.body(body).map_err(|e| format!("Bad request: {}", e))?;

    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| -> String { match e {} })?;

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| format!("Failed to read body: {}", e))?;
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
    };

    Ok(TestResponse {
        status,
        location,
        body,
    })
}

pub async fn get(app: &Router, uri: &str) -> Result<TestResponse, String> {
    send(app, Method::GET, uri, None).await
}

pub async fn put(app: &Router, uri: &str, body: serde_json::Value) -> Result<TestResponse, String> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Result<TestResponse, String> {
    send(app, Method::DELETE, uri, None).await
}
