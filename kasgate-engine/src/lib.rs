// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod analytics;
pub mod application;
pub mod domain;
pub mod infra;
pub mod merchant;
pub mod session;
pub mod tracker;
pub mod watcher;
pub mod webhook;
