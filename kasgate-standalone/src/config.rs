// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use kasgate_api::infra::api;
use kasgate_common::{infra::pool, telemetry};
use kasgate_engine::{application, infra::{indexer::http, node::wrpc}};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "run_migrations_default")]
    pub run_migrations: bool,

    #[serde(rename = "application")]
    pub application_config: application::Config,

    #[serde(rename = "infra")]
    pub infra_config: InfraConfig,

    #[serde(rename = "telemetry", default)]
    pub telemetry_config: telemetry::Config,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InfraConfig {
    #[serde(rename = "api", default)]
    pub api_config: api::Config,

    #[serde(rename = "storage")]
    pub storage_config: pool::sqlite::Config,

    #[serde(rename = "node", default)]
    pub node_config: wrpc::Config,

    #[serde(rename = "indexer", default)]
    pub indexer_config: http::Config,
}

const fn run_migrations_default() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasgate_common::{config::ConfigExt, domain::NetworkId};

    #[test]
    fn test_minimal_config() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                application:
                  network: testnet-10
                infra:
                  storage:
                    database_path: ":memory:"
                "#,
            )?;

            let config = Config::load().expect("config can be loaded");
            assert!(config.run_migrations);
            assert_eq!(config.application_config.network, NetworkId::Testnet10);
            assert_eq!(config.infra_config.storage_config.database_path, ":memory:");
            assert_eq!(config.infra_config.api_config.port, 8080);

            Ok(())
        });
    }

    #[test]
    fn test_env_aliases_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                application:
                  network: mainnet
                infra:
                  storage:
                    database_path: ":memory:"
                "#,
            )?;
            jail.set_env("NETWORK", "testnet-10");
            jail.set_env("PORT", "9090");
            jail.set_env("DATABASE_PATH", "/tmp/kasgate.db");

            let config = Config::load().expect("config can be loaded");
            assert_eq!(config.application_config.network, NetworkId::Testnet10);
            assert_eq!(config.infra_config.api_config.port, 9090);
            assert_eq!(
                config.infra_config.storage_config.database_path,
                "/tmp/kasgate.db"
            );

            Ok(())
        });
    }
}
