// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

mod merchant;
mod session;
mod webhook;

pub use merchant::*;
pub use session::*;
pub use webhook::*;

/// A database transaction handed out by [`SessionStorage::begin`]. Multi-row state
/// transitions that must be atomic run against one of these and commit explicitly.
pub type Tx = sqlx::Transaction<'static, sqlx::Sqlite>;

/// Storage abstraction, combining the per-area storages.
pub trait Storage
where
    Self: MerchantStorage + SessionStorage + WebhookStorage,
{
}
