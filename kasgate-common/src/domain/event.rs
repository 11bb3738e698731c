// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::domain::{Address, Sompi, TransactionId};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle status of a payment session.
///
/// Allowed transitions form a DAG: `pending → confirming → confirmed`, `pending → expired` and
/// `confirming → failed`. The terminal statuses `confirmed`, `expired` and `failed` have no
/// outgoing edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Confirming,
    Confirmed,
    Expired,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Confirming => "confirming",
            SessionStatus::Confirmed => "confirmed",
            SessionStatus::Expired => "expired",
            SessionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Confirmed | SessionStatus::Expired | SessionStatus::Failed
        )
    }

    /// Whether the edge `self → to` is part of the lifecycle DAG.
    pub fn can_transition_to(&self, to: SessionStatus) -> bool {
        matches!(
            (self, to),
            (SessionStatus::Pending, SessionStatus::Confirming)
                | (SessionStatus::Pending, SessionStatus::Expired)
                | (SessionStatus::Confirming, SessionStatus::Confirmed)
                | (SessionStatus::Confirming, SessionStatus::Failed)
        )
    }
}

impl Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = UnknownSessionStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "confirming" => Ok(SessionStatus::Confirming),
            "confirmed" => Ok(SessionStatus::Confirmed),
            "expired" => Ok(SessionStatus::Expired),
            "failed" => Ok(SessionStatus::Failed),
            other => Err(UnknownSessionStatus(other.to_owned())),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown session status {0}")]
pub struct UnknownSessionStatus(String);

/// Events flowing through the in-process bus. Components publish without knowing their
/// consumers, which keeps the component graph a DAG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    /// A new session was created and its address is being monitored.
    SessionCreated {
        session_id: Uuid,
        merchant_id: Uuid,
    },

    /// The ledger watcher observed a qualifying total on a monitored address. Fired at most
    /// once per monitored address.
    PaymentDetected {
        session_id: Uuid,
        address: Address,
        tx_id: TransactionId,
        amount: Sompi,
    },

    /// A session moved to a new status.
    StatusChanged {
        session_id: Uuid,
        merchant_id: Uuid,
        status: SessionStatus,
        confirmations: u64,
    },

    /// The confirmation count of a confirming session advanced.
    ConfirmationsUpdated {
        session_id: Uuid,
        confirmations: u64,
        required: u64,
    },
}

impl PaymentEvent {
    pub fn session_id(&self) -> Uuid {
        match self {
            PaymentEvent::SessionCreated { session_id, .. }
            | PaymentEvent::PaymentDetected { session_id, .. }
            | PaymentEvent::StatusChanged { session_id, .. }
            | PaymentEvent::ConfirmationsUpdated { session_id, .. } => *session_id,
        }
    }
}
