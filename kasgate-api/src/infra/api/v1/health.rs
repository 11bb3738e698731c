// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::infra::api::AppState;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use kasgate_common::domain::Publisher;
use kasgate_engine::domain::{
    deriver::AddressDeriver,
    indexer::LedgerIndexer,
    node::Node,
    storage::Storage,
};
use serde::Serialize;
use serde_json::json;

pub fn make_app<S, D, P, N, I>(state: AppState<S, D, P, N, I>) -> Router
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(health))
        .route("/health/ready", get(ready::<S, D, P, N, I>))
        .route("/health/detailed", get(detailed::<S, D, P, N, I>))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn ready<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
) -> impl IntoResponse
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    match state.storage.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "store unavailable" })),
        ),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailedHealth {
    status: &'static str,
    checks: HealthChecks,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthChecks {
    store: &'static str,
    node: &'static str,
    indexer: &'static str,
}

async fn detailed<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
) -> Json<DetailedHealth>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let store = match state.storage.ping().await {
        Ok(()) => "ok",
        Err(_) => "error",
    };
    let node = if state.watcher.node().is_connected() {
        "connected"
    } else {
        "disconnected"
    };
    let indexer = match state.watcher.indexer().probe().await {
        Ok(()) => "ok",
        Err(_) => "error",
    };

    // The poll baseline makes the indexer the only hard ledger dependency; a disconnected
    // push backend alone is degraded, not down.
    let status = if store == "ok" && indexer == "ok" {
        "ok"
    } else {
        "degraded"
    };

    Json(DetailedHealth {
        status,
        checks: HealthChecks {
            store,
            node,
            indexer,
        },
    })
}
