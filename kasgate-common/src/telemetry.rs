// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use log::{error, info};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Prometheus scrape endpoint; metrics are disabled when absent.
    #[serde(default, rename = "metrics")]
    pub metrics_config: Option<MetricsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub address: IpAddr,
    pub port: u16,
}

/// Initialize stderr logging. The filter is taken from `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    logforth::builder()
        .dispatch(|dispatch| {
            dispatch
                .filter(logforth::filter::EnvFilter::from_default_env_or("info"))
                .append(logforth::append::Stderr::default())
        })
        .apply();
}

/// Install the Prometheus exporter if configured. A failing exporter is logged and ignored;
/// metrics are observability, not a startup dependency.
pub fn init_metrics(config: Option<MetricsConfig>) {
    let Some(MetricsConfig { address, port }) = config else {
        return;
    };

    let listener = SocketAddr::new(address, port);
    match PrometheusBuilder::new().with_http_listener(listener).install() {
        Ok(()) => info!(listener:%; "serving Prometheus metrics"),
        Err(error) => error!(error:%, listener:%; "cannot install Prometheus exporter"),
    }
}
