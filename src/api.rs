//! HTTP endpoints served by every node.
//!
//! The public endpoints are used by clients, the internal ones only by the
//! sync loop of a replica pointed at this node.

use crate::engine::KvsEngine;
use crate::store::Snapshot;
use crate::{ErrorKind, KvStoreError, Result};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

pub const SET_PATH: &str = "/set";
pub const GET_PATH: &str = "/get";
pub const INTERNAL_GET_PATH: &str = "/internal/get";
pub const INTERNAL_SET_PATH: &str = "/internal/set";

#[derive(Debug, Deserialize)]
struct GetParams {
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SnapshotParams {
    /// Accepted for compatibility with older replicas, which asked only for
    /// records changed since this time. The full snapshot is always returned.
    last_update_time: Option<String>,
}

pub fn router<E: KvsEngine>(store: E) -> Router {
    Router::new()
        .route(SET_PATH, post(set_keys::<E>))
        .route(GET_PATH, get(get_key::<E>))
        .route(INTERNAL_GET_PATH, get(internal_get::<E>))
        .route(INTERNAL_SET_PATH, post(internal_set::<E>))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Bodies are decoded by hand rather than through the `Json` extractor so
/// that requests without a JSON content type are still accepted, and every
/// malformed body maps onto the same validation error.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| KvStoreError::InvalidRequest(format!("malformed body: {e}")))
}

async fn set_keys<E: KvsEngine>(State(store): State<E>, body: Bytes) -> Result<StatusCode> {
    let pairs: HashMap<String, String> = parse_body(&body)?;
    store.set_many(pairs);
    Ok(StatusCode::OK)
}

async fn get_key<E: KvsEngine>(
    State(store): State<E>,
    Query(params): Query<GetParams>,
) -> Result<Json<HashMap<String, String>>> {
    let key = params
        .key
        .ok_or_else(|| KvStoreError::InvalidRequest("missing 'key' parameter".to_string()))?;
    let value = store.get(&key)?;
    Ok(Json(HashMap::from([(key, value)])))
}

async fn internal_get<E: KvsEngine>(
    State(store): State<E>,
    Query(params): Query<SnapshotParams>,
) -> Result<Response> {
    if let Some(since) = params.last_update_time {
        since.parse::<i64>().map_err(|e| {
            KvStoreError::InvalidRequest(format!("invalid 'last_update_time' {since:?}: {e}"))
        })?;
    }

    let snapshot = store.snapshot();
    if snapshot.is_empty() {
        debug!("No records to serve");
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    debug!(records = snapshot.len(), "Serving snapshot");
    Ok(Json(snapshot).into_response())
}

async fn internal_set<E: KvsEngine>(State(store): State<E>, body: Bytes) -> Result<StatusCode> {
    let incoming: Snapshot = parse_body(&body)?;
    let received = incoming.len();
    let applied = store.merge(incoming);
    debug!(received, applied, "Merged pushed snapshot");
    Ok(StatusCode::OK)
}

impl IntoResponse for KvStoreError {
    fn into_response(self) -> Response {
        // Absent keys are reported as a server error, which existing clients
        // rely on.
        let status = match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        match self.kind() {
            ErrorKind::Validation | ErrorKind::NotFound => debug!(%status, "{self}"),
            _ => warn!(%status, "{self}"),
        }
        (status, self.to_string()).into_response()
    }
}
