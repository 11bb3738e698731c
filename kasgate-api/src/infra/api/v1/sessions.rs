// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::infra::api::{
    ApiError, AppState, AuthMerchant, ClientIp, limits, v1::validate,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use kasgate_common::domain::{NetworkId, Publisher, SessionStatus, Sompi, sompi_to_kas};
use kasgate_engine::{
    domain::{
        Session,
        deriver::AddressDeriver,
        indexer::LedgerIndexer,
        node::Node,
        storage::Storage,
    },
    session::NewSession,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// KAS amount as a decimal string, e.g. `"1.5"`.
    pub amount: String,
    pub order_id: Option<String>,
    pub metadata: Option<BTreeMap<String, String>>,
    pub redirect_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub id: Uuid,
    pub address: String,
    /// Canonical KAS amount.
    pub amount: String,
    pub amount_sompi: Sompi,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Payment URI the widget feeds into its QR renderer.
    pub qr_code: String,
    /// The only response that ever carries the subscription token.
    pub subscription_token: String,
    pub expires_at: DateTime<Utc>,
    pub explorer_url: String,
}

/// Public view of a session; never includes the subscription token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub address: String,
    pub amount: String,
    pub amount_sompi: Sompi,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    pub confirmations: u64,
    pub required_confirmations: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    pub explorer_url: String,
}

impl SessionView {
    pub fn new(session: Session, network: NetworkId, required_confirmations: u64) -> Self {
        let explorer_url = explorer_address_url(network, &session.address);

        Self {
            id: session.id,
            merchant_id: session.merchant_id,
            address: session.address,
            amount: sompi_to_kas(session.amount),
            amount_sompi: session.amount,
            status: session.status,
            tx_id: session.tx_id,
            confirmations: session.confirmations,
            required_confirmations,
            order_id: session.order_id,
            metadata: session.metadata,
            redirect_url: session.redirect_url,
            created_at: session.created_at,
            expires_at: session.expires_at,
            paid_at: session.paid_at,
            confirmed_at: session.confirmed_at,
            explorer_url,
        }
    }
}

fn explorer_address_url(network: NetworkId, address: &str) -> String {
    format!("{}/addresses/{address}", network.explorer_url())
}

/// Payment URI for the session; the address carries its own network prefix.
fn payment_uri(address: &str, amount: Sompi) -> String {
    format!("{address}?amount={}", sompi_to_kas(amount))
}

pub async fn create<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    ClientIp(ip): ClientIp,
    AuthMerchant(merchant): AuthMerchant,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let (limit, window) = limits::SESSION_CREATE;
    state.rate_limiter.check("session_create", ip, limit, window)?;

    let amount = validate::amount(&body.amount)?;
    let order_id = body
        .order_id
        .as_deref()
        .map(validate::order_id)
        .transpose()?
        .filter(|order_id| !order_id.is_empty());
    let metadata = body
        .metadata
        .as_ref()
        .map(validate::metadata)
        .transpose()?
        .filter(|metadata| !metadata.is_empty());
    let redirect_url = body
        .redirect_url
        .as_deref()
        .map(|url| validate::url(url, false))
        .transpose()?;

    let session = state
        .sessions
        .create_session(
            merchant.id,
            NewSession {
                amount,
                order_id,
                metadata,
                redirect_url,
            },
        )
        .await
        .map_err(|error| state.map_session_error(error))?;

    let response = CreateSessionResponse {
        id: session.id,
        qr_code: payment_uri(&session.address, session.amount),
        explorer_url: explorer_address_url(state.network, &session.address),
        address: session.address,
        amount: sompi_to_kas(session.amount),
        amount_sompi: session.amount,
        status: session.status,
        order_id: session.order_id,
        subscription_token: session.subscription_token,
        expires_at: session.expires_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_session<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let session = state
        .sessions
        .get_session(id)
        .await
        .map_err(|error| state.map_session_error(error))?;

    Ok(Json(SessionView::new(
        session,
        state.network,
        state.sessions.confirmation_threshold(),
    )))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub id: Uuid,
    pub status: SessionStatus,
    pub confirmations: u64,
    pub required_confirmations: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}

pub async fn status<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionStatusResponse>, ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let session = state
        .sessions
        .get_session(id)
        .await
        .map_err(|error| state.map_session_error(error))?;

    Ok(Json(SessionStatusResponse {
        id: session.id,
        status: session.status,
        confirmations: session.confirmations,
        required_confirmations: state.sessions.confirmation_threshold(),
        tx_id: session.tx_id,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSessionResponse {
    pub id: Uuid,
    pub status: SessionStatus,
}

pub async fn cancel<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    AuthMerchant(merchant): AuthMerchant,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelSessionResponse>, ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let session = state
        .sessions
        .get_session(id)
        .await
        .map_err(|error| state.map_session_error(error))?;
    if session.merchant_id != merchant.id {
        return Err(ApiError::NotFound("session"));
    }

    let session = state
        .sessions
        .mark_expired(id)
        .await
        .map_err(|error| state.map_session_error(error))?;

    Ok(Json(CancelSessionResponse {
        id: session.id,
        status: session.status,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSessionsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionView>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

pub async fn list<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    AuthMerchant(merchant): AuthMerchant,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<ListSessionsResponse>, ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0);
    let status = query
        .status
        .as_deref()
        .map(|status| {
            status
                .parse::<SessionStatus>()
                .map_err(|error| ApiError::bad_request("invalid_status", error.to_string()))
        })
        .transpose()?;

    let (sessions, total) = state
        .sessions
        .list_sessions(merchant.id, status, limit, offset)
        .await
        .map_err(|error| state.map_session_error(error))?;

    let required_confirmations = state.sessions.confirmation_threshold();
    let sessions = sessions
        .into_iter()
        .map(|session| SessionView::new(session, state.network, required_confirmations))
        .collect();

    Ok(Json(ListSessionsResponse {
        sessions,
        total,
        limit,
        offset,
    }))
}
