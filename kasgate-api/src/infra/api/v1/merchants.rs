// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::infra::api::{
    ApiError, AppState, AuthMerchant, ClientIp, limits, v1::validate,
};
use axum::{Json, extract::{Query, State}, http::StatusCode};
use chrono::{DateTime, Utc};
use kasgate_common::domain::Publisher;
use kasgate_engine::{
    analytics::{self, AnalyticsPeriod, MerchantAnalytics, MerchantStats},
    domain::{
        Merchant,
        deriver::AddressDeriver,
        indexer::LedgerIndexer,
        node::Node,
        storage::{MerchantPatch, Storage},
    },
    merchant::NewMerchant,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMerchantRequest {
    pub name: String,
    pub email: Option<String>,
    pub xpub: String,
    pub webhook_url: Option<String>,
}

/// Creation response; the only place the API key plaintext and webhook secret ever appear.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMerchantResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub webhook_secret: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub next_address_index: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Merchant> for MerchantResponse {
    fn from(merchant: Merchant) -> Self {
        Self {
            id: merchant.id,
            name: merchant.name,
            email: merchant.email,
            webhook_url: merchant.webhook_url,
            next_address_index: merchant.next_address_index,
            created_at: merchant.created_at,
            updated_at: merchant.updated_at,
        }
    }
}

pub async fn create<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    ClientIp(ip): ClientIp,
    Json(body): Json<CreateMerchantRequest>,
) -> Result<(StatusCode, Json<CreateMerchantResponse>), ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let (limit, window) = limits::MERCHANT_CREATE;
    state.rate_limiter.check("merchant_create", ip, limit, window)?;

    let name = validate::name(&body.name)?;
    let email = body.email.as_deref().map(validate::email).transpose()?;
    validate::xpub(&body.xpub, &state.deriver)?;
    let webhook_url = body
        .webhook_url
        .as_deref()
        .map(|url| validate::url(url, true))
        .transpose()?;

    let merchant = state
        .merchants
        .create_merchant(NewMerchant {
            name,
            email,
            xpub: body.xpub,
            webhook_url,
        })
        .await
        .map_err(|error| state.map_merchant_error(error))?;

    let response = CreateMerchantResponse {
        id: merchant.id,
        name: merchant.name.clone(),
        email: merchant.email.clone(),
        api_key: merchant.api_key.clone().unwrap_or_default(),
        webhook_url: merchant.webhook_url.clone(),
        webhook_secret: merchant.webhook_secret.clone(),
        created_at: merchant.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn me<S, D, P, N, I>(
    State(_state): State<AppState<S, D, P, N, I>>,
    AuthMerchant(merchant): AuthMerchant,
) -> Json<MerchantResponse>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    Json(merchant.into())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMerchantRequest {
    pub name: Option<String>,

    /// `null` clears the email, absence leaves it untouched.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub email: Option<Option<String>>,

    /// `null` clears the webhook URL, absence leaves it untouched.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub webhook_url: Option<Option<String>>,
}

pub async fn update<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    AuthMerchant(merchant): AuthMerchant,
    Json(body): Json<UpdateMerchantRequest>,
) -> Result<Json<MerchantResponse>, ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let name = body.name.as_deref().map(validate::name).transpose()?;
    let email = match body.email {
        Some(Some(email)) => Some(Some(validate::email(&email)?)),
        other => other,
    };
    let webhook_url = match body.webhook_url {
        Some(Some(url)) => Some(Some(validate::url(&url, true)?)),
        other => other,
    };

    let updated = state
        .merchants
        .update_merchant(
            merchant.id,
            MerchantPatch {
                name,
                email,
                webhook_url,
            },
        )
        .await
        .map_err(|error| state.map_merchant_error(error))?;

    Ok(Json(updated.into()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub api_key: String,
}

pub async fn regenerate_api_key<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    AuthMerchant(merchant): AuthMerchant,
) -> Result<Json<ApiKeyResponse>, ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let api_key = state
        .merchants
        .regenerate_api_key(merchant.id)
        .await
        .map_err(|error| state.map_merchant_error(error))?;

    Ok(Json(ApiKeyResponse {
        api_key: api_key.expose_secret().to_owned(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSecretResponse {
    pub webhook_secret: String,
}

pub async fn regenerate_webhook_secret<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    AuthMerchant(merchant): AuthMerchant,
) -> Result<Json<WebhookSecretResponse>, ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let webhook_secret = state
        .merchants
        .regenerate_webhook_secret(merchant.id)
        .await
        .map_err(|error| state.map_merchant_error(error))?;

    Ok(Json(WebhookSecretResponse {
        webhook_secret: webhook_secret.expose_secret().to_owned(),
    }))
}

pub async fn stats<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    AuthMerchant(merchant): AuthMerchant,
) -> Result<Json<MerchantStats>, ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let stats = analytics::merchant_stats(&state.storage, merchant.id)
        .await
        .map_err(|error| state.internal(error))?;

    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn analytics<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    AuthMerchant(merchant): AuthMerchant,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<MerchantAnalytics>, ApiError>
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let period = query
        .period
        .as_deref()
        .map(|period| {
            period
                .parse::<AnalyticsPeriod>()
                .map_err(|error| ApiError::bad_request("invalid_period", error.to_string()))
        })
        .transpose()?
        .unwrap_or(AnalyticsPeriod::Month);
    let start_date = query
        .start_date
        .as_deref()
        .map(|value| validate::date_param(value, "startDate"))
        .transpose()?;
    let end_date = query
        .end_date
        .as_deref()
        .map(|value| validate::date_param(value, "endDate"))
        .transpose()?;

    let report = analytics::merchant_analytics(
        &state.storage,
        merchant.id,
        period,
        start_date,
        end_date,
    )
    .await
    .map_err(|error| state.internal(error))?;

    Ok(Json(report))
}
