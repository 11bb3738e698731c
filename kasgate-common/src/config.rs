// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;
use std::env;

const CONFIG_FILE_VAR: &str = "CONFIG_FILE";
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Well-known environment variables and the configuration keys they map onto. These exist so a
/// deployment can be configured with the short names documented for operators instead of the
/// full `KASGATE__…` form.
const ALIASES: &[(&str, &str)] = &[
    ("NETWORK", "application.network"),
    ("HOST", "infra.api.address"),
    ("PORT", "infra.api.port"),
    ("CORS_ALLOWED_ORIGINS", "infra.api.cors_allowed_origins"),
    ("DATABASE_PATH", "infra.storage.database_path"),
];

/// Load a configuration from `config.yaml` (overridable via `CONFIG_FILE`), then environment
/// variables prefixed with `KASGATE__` using `__` as section separator, then the short aliases.
pub trait ConfigExt
where
    Self: for<'de> Deserialize<'de>,
{
    fn load() -> Result<Self, figment::Error> {
        let config_file =
            env::var(CONFIG_FILE_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_owned());

        Figment::new()
            .merge(Yaml::file(config_file))
            .merge(Env::prefixed("KASGATE__").split("__"))
            .merge(
                Env::raw()
                    .only(&ALIASES.iter().map(|(var, _)| *var).collect::<Vec<_>>())
                    .map(|var| {
                        let var = var.as_str();
                        ALIASES
                            .iter()
                            .find(|(alias, _)| var.eq_ignore_ascii_case(alias))
                            .map(|(_, key)| (*key).to_owned())
                            .unwrap_or_else(|| var.to_owned())
                            .into()
                    })
                    .split("."),
            )
            .extract()
    }
}

impl<T> ConfigExt for T where T: for<'de> Deserialize<'de> {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        application: ApplicationConfig,
    }

    #[derive(Debug, Deserialize)]
    struct ApplicationConfig {
        network: String,
    }

    #[test]
    fn test_alias_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                "application:\n  network: mainnet\n",
            )?;
            jail.set_env("NETWORK", "testnet-10");

            let config = TestConfig::load().expect("config can be loaded");
            assert_eq!(config.application.network, "testnet-10");

            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "application:\n  network: mainnet\n")?;
            jail.set_env("KASGATE__APPLICATION__NETWORK", "testnet-10");

            let config = TestConfig::load().expect("config can be loaded");
            assert_eq!(config.application.network, "testnet-10");

            Ok(())
        });
    }
}
