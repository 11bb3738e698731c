// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod telemetry;
