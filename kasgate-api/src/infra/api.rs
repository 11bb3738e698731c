// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod v1;

use crate::hub::SubscriptionHub;
use axum::{
    Json, Router,
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{HeaderValue, StatusCode, request::Parts},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use dashmap::DashMap;
use kasgate_common::domain::{NetworkId, Publisher};
use kasgate_engine::{
    domain::{
        Merchant,
        deriver::AddressDeriver,
        indexer::LedgerIndexer,
        node::Node,
        storage::Storage,
    },
    merchant::{MerchantError, MerchantService},
    session::{SessionError, SessionManager},
    watcher::LedgerWatcher,
};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::{
    convert::Infallible,
    future::Future,
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "address_default")]
    pub address: IpAddr,

    #[serde(default = "port_default")]
    pub port: u16,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "request_body_limit_default")]
    pub request_body_limit: usize,

    /// Comma-separated origin allowlist for `/api/v1`; `*` allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// In production, invariant violations surface as a generic 500.
    #[serde(default)]
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: address_default(),
            port: port_default(),
            request_body_limit: request_body_limit_default(),
            cors_allowed_origins: None,
            production: false,
        }
    }
}

fn address_default() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

const fn port_default() -> u16 {
    8080
}

const fn request_body_limit_default() -> usize {
    1024 * 1024
}

/// Everything the handlers need, cheap to clone.
pub struct AppState<S, D, P, N, I> {
    pub merchants: MerchantService<S>,
    pub sessions: SessionManager<S, D, P>,
    pub storage: S,
    pub watcher: LedgerWatcher<N, I, P>,
    pub deriver: D,
    pub hub: SubscriptionHub,
    pub network: NetworkId,
    pub rate_limiter: RateLimiter,
    pub production: bool,
}

impl<S: Clone, D: Clone, P: Clone, N: Clone, I: Clone> Clone for AppState<S, D, P, N, I> {
    fn clone(&self) -> Self {
        Self {
            merchants: self.merchants.clone(),
            sessions: self.sessions.clone(),
            storage: self.storage.clone(),
            watcher: self.watcher.clone(),
            deriver: self.deriver.clone(),
            hub: self.hub.clone(),
            network: self.network,
            rate_limiter: self.rate_limiter.clone(),
            production: self.production,
        }
    }
}

impl<S, D, P, N, I> AppState<S, D, P, N, I> {
    /// Wrap an unexpected error: logged at error severity, generic message in production.
    pub fn internal(&self, error: impl Into<anyhow::Error>) -> ApiError {
        let error = error.into();
        error!(error:% = format!("{error:#}"); "internal error");

        if self.production {
            ApiError::Internal("internal server error".to_owned())
        } else {
            ApiError::Internal(format!("{error:#}"))
        }
    }

    pub fn map_session_error(&self, error: SessionError) -> ApiError {
        match error {
            SessionError::SessionNotFound(_) => ApiError::NotFound("session"),
            SessionError::MerchantNotFound(_) => ApiError::NotFound("merchant"),
            SessionError::InvalidTransition { from, to, .. } => ApiError::BadRequest {
                code: "invalid_transition",
                message: format!("cannot transition from {from} to {to}"),
            },
            other => self.internal(other),
        }
    }

    pub fn map_merchant_error(&self, error: MerchantError) -> ApiError {
        match error {
            MerchantError::NotFound(_) => ApiError::NotFound("merchant"),
            MerchantError::DuplicateEmail => {
                ApiError::Conflict("a merchant with this email already exists".to_owned())
            }
            other => self.internal(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest {
        code: &'static str,
        message: String,
    },

    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code,
            message: message.into(),
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest { code, .. } => (StatusCode::BAD_REQUEST, code),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "invalid_api_key"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = json!({ "error": { "code": code, "message": self.to_string() } });

        (status, Json(body)).into_response()
    }
}

/// Authenticated merchant, resolved from the `X-API-Key` header by digest. Unknown keys and
/// unknown merchants are indistinguishable.
pub struct AuthMerchant(pub Merchant);

impl<S, D, P, N, I> FromRequestParts<AppState<S, D, P, N, I>> for AuthMerchant
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S, D, P, N, I>,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get("X-API-Key")
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        state
            .merchants
            .lookup_by_api_key(api_key)
            .await
            .map_err(|error| state.internal(error))?
            .map(AuthMerchant)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Source IP of the caller; falls back to the unspecified address when the server runs
/// without connect info (tests).
pub struct ClientIp(pub IpAddr);

impl<T> FromRequestParts<T> for ClientIp
where
    T: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &T) -> Result<Self, Self::Rejection> {
        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        Ok(ClientIp(ip))
    }
}

/// Fixed-window request counter per `(scope, source IP)`.
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    windows: Arc<DashMap<(&'static str, IpAddr), (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(
        &self,
        scope: &'static str,
        ip: IpAddr,
        limit: u32,
        window: Duration,
    ) -> Result<(), ApiError> {
        let now = Instant::now();
        let mut entry = self.windows.entry((scope, ip)).or_insert((now, 0));

        let (window_start, count) = *entry;
        if now.duration_since(window_start) >= window {
            *entry = (now, 1);
            return Ok(());
        }

        if count >= limit {
            return Err(ApiError::RateLimited);
        }

        *entry = (window_start, count + 1);
        Ok(())
    }
}

/// Request limits of the HTTP surface, per source IP.
pub mod limits {
    use std::time::Duration;

    pub const GENERAL: (u32, Duration) = (1_000, Duration::from_secs(60));
    pub const MERCHANT_CREATE: (u32, Duration) = (10, Duration::from_secs(60 * 60));
    pub const SESSION_CREATE: (u32, Duration) = (100, Duration::from_secs(60));
}

async fn general_rate_limit<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    ClientIp(ip): ClientIp,
    request: Request,
    next: Next,
) -> Response
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let (limit, window) = limits::GENERAL;
    match state.rate_limiter.check("general", ip, limit, window) {
        Ok(()) => next.run(request).await,
        Err(error) => error.into_response(),
    }
}

#[derive(Debug, Error)]
pub enum AxumApiError {
    #[error("cannot bind tcp listener")]
    Bind(#[source] io::Error),

    #[error("cannot serve API")]
    Serve(#[source] io::Error),
}

/// The axum-based HTTP and realtime surface.
pub struct AxumApi {
    config: Config,
}

impl AxumApi {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn serve<S, D, P, N, I>(
        self,
        state: AppState<S, D, P, N, I>,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), AxumApiError>
    where
        S: Storage,
        D: AddressDeriver,
        P: Publisher,
        N: Node,
        I: LedgerIndexer,
    {
        let app = make_app(&self.config, state);
        let Config { address, port, .. } = self.config;

        let listener = TcpListener::bind((address, port))
            .await
            .map_err(AxumApiError::Bind)?;
        info!(address:?, port; "listening to TCP connections");

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(AxumApiError::Serve)
    }
}

pub fn make_app<S, D, P, N, I>(config: &Config, state: AppState<S, D, P, N, I>) -> Router
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let api_cors = match config.cors_allowed_origins.as_deref() {
        None | Some("") | Some("*") => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(origins) => {
            let origins = origins
                .split(',')
                .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
                .collect::<Vec<_>>();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    let v1_app = v1::make_app(state.clone())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            general_rate_limit::<S, D, P, N, I>,
        ))
        .layer(api_cors);

    let health_app = v1::health::make_app(state.clone()).layer(CorsLayer::permissive());

    let ws_app = Router::new()
        .route("/ws", get(v1::ws::handler::<S, D, P, N, I>))
        .with_state(state);

    Router::new()
        .nest("/api/v1", v1_app)
        .merge(health_app)
        .merge(ws_app)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(config.request_body_limit)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_fixed_window() {
        let limiter = RateLimiter::new();
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let window = Duration::from_secs(60);

        for _ in 0..3 {
            limiter.check("test", ip, 3, window).unwrap();
        }
        assert_matches::assert_matches!(
            limiter.check("test", ip, 3, window),
            Err(ApiError::RateLimited)
        );

        // Scopes and IPs are independent windows.
        limiter.check("other", ip, 3, window).unwrap();
        limiter
            .check("test", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 3, window)
            .unwrap();
    }

    #[test]
    fn test_error_envelope() {
        let response = ApiError::bad_request("invalid_amount", "amount below minimum")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = ApiError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
