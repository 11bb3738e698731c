// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod health;
pub mod merchants;
pub mod sessions;
pub mod validate;
pub mod webhook_logs;
pub mod ws;

use crate::infra::api::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use kasgate_common::domain::Publisher;
use kasgate_engine::domain::{
    deriver::AddressDeriver, indexer::LedgerIndexer, node::Node, storage::Storage,
};

pub fn make_app<S, D, P, N, I>(state: AppState<S, D, P, N, I>) -> Router
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    Router::new()
        .route("/merchants", post(merchants::create::<S, D, P, N, I>))
        .route(
            "/merchants/me",
            get(merchants::me::<S, D, P, N, I>).patch(merchants::update::<S, D, P, N, I>),
        )
        .route(
            "/merchants/me/regenerate-api-key",
            post(merchants::regenerate_api_key::<S, D, P, N, I>),
        )
        .route(
            "/merchants/me/regenerate-webhook-secret",
            post(merchants::regenerate_webhook_secret::<S, D, P, N, I>),
        )
        .route(
            "/merchants/me/sessions",
            get(sessions::list::<S, D, P, N, I>),
        )
        .route("/merchants/me/stats", get(merchants::stats::<S, D, P, N, I>))
        .route(
            "/merchants/me/analytics",
            get(merchants::analytics::<S, D, P, N, I>),
        )
        .route(
            "/merchants/me/webhook-logs",
            get(webhook_logs::list::<S, D, P, N, I>),
        )
        .route(
            "/merchants/me/webhook-logs/{id}/retry",
            post(webhook_logs::retry::<S, D, P, N, I>),
        )
        .route("/sessions", post(sessions::create::<S, D, P, N, I>))
        .route("/sessions/{id}", get(sessions::get_session::<S, D, P, N, I>))
        .route(
            "/sessions/{id}/status",
            get(sessions::status::<S, D, P, N, I>),
        )
        .route(
            "/sessions/{id}/cancel",
            post(sessions::cancel::<S, D, P, N, I>),
        )
        .with_state(state)
}
