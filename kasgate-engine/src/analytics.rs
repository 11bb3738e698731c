// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Merchant-scoped aggregates. All read-only against the store; the in-memory state of the
//! other components is deliberately bypassed.

use crate::domain::storage::SessionStorage;
use chrono::{DateTime, Duration, Utc};
use kasgate_common::domain::{SessionStatus, Sompi};
use serde::Serialize;
use std::{collections::BTreeMap, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

const TOP_PAYMENTS_LIMIT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsPeriod {
    Day,
    Week,
    Month,
}

impl AnalyticsPeriod {
    pub fn duration(&self) -> Duration {
        match self {
            AnalyticsPeriod::Day => Duration::days(1),
            AnalyticsPeriod::Week => Duration::days(7),
            AnalyticsPeriod::Month => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsPeriod::Day => "day",
            AnalyticsPeriod::Week => "week",
            AnalyticsPeriod::Month => "month",
        }
    }
}

impl FromStr for AnalyticsPeriod {
    type Err = UnknownAnalyticsPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(AnalyticsPeriod::Day),
            "week" => Ok(AnalyticsPeriod::Week),
            "month" => Ok(AnalyticsPeriod::Month),
            other => Err(UnknownAnalyticsPeriod(other.to_owned())),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown analytics period {0}, expected day, week or month")]
pub struct UnknownAnalyticsPeriod(String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusDistribution {
    pub pending: u64,
    pub confirming: u64,
    pub confirmed: u64,
    pub expired: u64,
    pub failed: u64,
}

impl StatusDistribution {
    fn from_counts(counts: &[(SessionStatus, u64)]) -> Self {
        let mut distribution = Self::default();
        for (status, count) in counts {
            match status {
                SessionStatus::Pending => distribution.pending = *count,
                SessionStatus::Confirming => distribution.confirming = *count,
                SessionStatus::Confirmed => distribution.confirmed = *count,
                SessionStatus::Expired => distribution.expired = *count,
                SessionStatus::Failed => distribution.failed = *count,
            }
        }
        distribution
    }

    pub fn total(&self) -> u64 {
        self.pending + self.confirming + self.confirmed + self.expired + self.failed
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantStats {
    pub total_sessions: u64,
    pub status_counts: StatusDistribution,
    /// Summed confirmed volume in sompi, as a decimal string.
    pub confirmed_volume: Sompi,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub sessions: u64,
    pub confirmed: u64,
    pub volume: Sompi,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBreakdown {
    /// `YYYY-MM-DD`, UTC.
    pub date: String,
    pub sessions: u64,
    pub confirmed: u64,
    pub volume: Sompi,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPayment {
    pub session_id: Uuid,
    pub amount: Sompi,
    pub order_id: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantAnalytics {
    pub period: &'static str,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub summary: PeriodSummary,
    pub previous_summary: PeriodSummary,
    /// Session-count change vs. the previous period, in percent.
    pub sessions_change: Option<f64>,
    /// Confirmed-volume change vs. the previous period, in percent.
    pub volume_change: Option<f64>,
    pub status_distribution: StatusDistribution,
    pub daily: Vec<DailyBreakdown>,
    pub top_payments: Vec<TopPayment>,
}

pub async fn merchant_stats(
    storage: &impl SessionStorage,
    merchant_id: Uuid,
) -> Result<MerchantStats, sqlx::Error> {
    let status_counts =
        StatusDistribution::from_counts(&storage.get_status_counts(merchant_id).await?);
    let confirmed_volume = storage
        .get_confirmed_amounts(merchant_id, None, None)
        .await?
        .into_iter()
        .fold(Sompi(0), |total, (_, amount)| total + amount);

    Ok(MerchantStats {
        total_sessions: status_counts.total(),
        status_counts,
        confirmed_volume,
    })
}

pub async fn merchant_analytics(
    storage: &impl SessionStorage,
    merchant_id: Uuid,
    period: AnalyticsPeriod,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<MerchantAnalytics, sqlx::Error> {
    let end_date = end_date.unwrap_or_else(Utc::now);
    let start_date = start_date.unwrap_or(end_date - period.duration());
    let window = end_date - start_date;
    let previous_start = start_date - window;

    let summary = period_summary(storage, merchant_id, start_date, end_date).await?;
    let previous_summary = period_summary(storage, merchant_id, previous_start, start_date).await?;

    let status_distribution =
        StatusDistribution::from_counts(&storage.get_status_counts(merchant_id).await?);

    // Merge per-day creation counts with per-day confirmed amounts.
    let mut daily = BTreeMap::<String, DailyBreakdown>::new();
    for (date, sessions) in storage
        .get_daily_session_counts(merchant_id, start_date, end_date)
        .await?
    {
        daily
            .entry(date.clone())
            .or_insert_with(|| empty_day(date))
            .sessions = sessions;
    }
    for (date, amount) in storage
        .get_confirmed_amounts(merchant_id, Some(start_date), Some(end_date))
        .await?
    {
        let day = daily.entry(date.clone()).or_insert_with(|| empty_day(date));
        day.confirmed += 1;
        day.volume = day.volume + amount;
    }

    let top_payments = storage
        .get_top_sessions(merchant_id, Some(start_date), Some(end_date), TOP_PAYMENTS_LIMIT)
        .await?
        .into_iter()
        .map(|session| TopPayment {
            session_id: session.id,
            amount: session.amount,
            order_id: session.order_id,
            confirmed_at: session.confirmed_at,
        })
        .collect();

    Ok(MerchantAnalytics {
        period: period.as_str(),
        start_date,
        end_date,
        sessions_change: change_pct(previous_summary.sessions, summary.sessions),
        volume_change: change_pct(previous_summary.volume.0, summary.volume.0),
        summary,
        previous_summary,
        status_distribution,
        daily: daily.into_values().collect(),
        top_payments,
    })
}

async fn period_summary(
    storage: &impl SessionStorage,
    merchant_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<PeriodSummary, sqlx::Error> {
    let sessions = storage
        .get_session_count_between(merchant_id, from, to)
        .await?;
    let confirmed_amounts = storage
        .get_confirmed_amounts(merchant_id, Some(from), Some(to))
        .await?;

    Ok(PeriodSummary {
        sessions,
        confirmed: confirmed_amounts.len() as u64,
        volume: confirmed_amounts
            .into_iter()
            .fold(Sompi(0), |total, (_, amount)| total + amount),
    })
}

fn empty_day(date: String) -> DailyBreakdown {
    DailyBreakdown {
        date,
        sessions: 0,
        confirmed: 0,
        volume: Sompi(0),
    }
}

/// Percentage change from `previous` to `current`; `None` when there is no base to compare
/// against.
fn change_pct(previous: impl Into<u128>, current: impl Into<u128>) -> Option<f64> {
    let (previous, current) = (previous.into(), current.into());
    if previous == 0 {
        return None;
    }

    Some((current as f64 - previous as f64) / previous as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_pct() {
        assert_eq!(change_pct(0u64, 10u64), None);
        assert_eq!(change_pct(10u64, 15u64), Some(50.0));
        assert_eq!(change_pct(10u64, 5u64), Some(-50.0));
        assert_eq!(change_pct(10u64, 10u64), Some(0.0));
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("week".parse::<AnalyticsPeriod>().unwrap(), AnalyticsPeriod::Week);
        assert!("year".parse::<AnalyticsPeriod>().is_err());
        assert_eq!(AnalyticsPeriod::Month.duration(), Duration::days(30));
    }

    #[test]
    fn test_status_distribution() {
        let distribution = StatusDistribution::from_counts(&[
            (SessionStatus::Confirmed, 3),
            (SessionStatus::Expired, 2),
        ]);
        assert_eq!(distribution.confirmed, 3);
        assert_eq!(distribution.expired, 2);
        assert_eq!(distribution.total(), 5);
    }
}
