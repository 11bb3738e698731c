// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::infra::api::{ApiError, AppState, AuthMerchant};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use kasgate_common::domain::Publisher;
use kasgate_engine::domain::{
    WebhookDelivery, WebhookEvent,
    deriver::AddressDeriver,
    indexer::LedgerIndexer,
    node::Node,
    storage::Storage,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWebhookLogsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// `payment.`-prefixed event kind.
    pub event: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookLogView {
    pub id: Uuid,
    pub session_id: Uuid,
    pub event: String,
    pub delivery_id: Uuid,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_response_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl From<WebhookDelivery> for WebhookLogView {
    fn from(delivery: WebhookDelivery) -> Self {
        Self {
            id: delivery.id,
            session_id: delivery.session_id,
            event: delivery.event.as_str().to_owned(),
            delivery_id: delivery.delivery_id,
            attempts: delivery.attempts,
            last_status_code: delivery.last_status_code,
            last_response_body: delivery.last_response_body,
            next_retry_at: delivery.next_retry_at,
            created_at: delivery.created_at,
            delivered_at: delivery.delivered_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWebhookLogsResponse {
    pub attempts: Vec<WebhookLogView>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

pub async fn list<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    AuthMerchant(merchant): AuthMerchant,
    Query(query): Query<ListWebhookLogsQuery>,
) -> Result<Json<ListWebhookLogsResponse>, ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0);
    let event = query
        .event
        .as_deref()
        .map(|event| {
            WebhookEvent::from_str(event)
                .map_err(|error| ApiError::bad_request("invalid_event", error.to_string()))
        })
        .transpose()?;

    let (deliveries, total) = state
        .storage
        .get_merchant_webhook_deliveries(merchant.id, event, limit, offset)
        .await
        .map_err(|error| state.internal(error))?;

    Ok(Json(ListWebhookLogsResponse {
        attempts: deliveries.into_iter().map(WebhookLogView::from).collect(),
        total,
        limit,
        offset,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryResponse {
    pub status: &'static str,
}

/// Re-queue a failed delivery; owned rows only, delivered rows never.
pub async fn retry<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    AuthMerchant(merchant): AuthMerchant,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<RetryResponse>), ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let requeued = state
        .storage
        .requeue_webhook_delivery(id, merchant.id, Utc::now())
        .await
        .map_err(|error| state.internal(error))?;

    if !requeued {
        return Err(ApiError::NotFound("webhook delivery"));
    }

    Ok((StatusCode::ACCEPTED, Json(RetryResponse { status: "queued" })))
}
