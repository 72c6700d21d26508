use serde::Serialize;

use super::filter::{CRITICAL_THRESHOLD, HIGH_THRESHOLD};
use super::types::Alert;

/// Number of entries in the recent activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Critical,
    High,
    Standard,
}

impl RiskTier {
    pub fn of(score: i64) -> Self {
        if score >= CRITICAL_THRESHOLD {
            Self::Critical
        } else if score >= HIGH_THRESHOLD {
            Self::High
        } else {
            Self::Standard
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "Critical Tier",
            Self::High => "High Priority",
            Self::Standard => "Standard Audit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCount {
    pub tier: RiskTier,
    pub label: &'static str,
    pub count: usize,
    /// Share of all alerts, 0 when there are none.
    pub percent: f64,
}

/// Count alerts per risk tier, in Critical, High, Standard order.
pub fn tier_breakdown(alerts: &[Alert]) -> Vec<TierCount> {
    let total = alerts.len();
    [RiskTier::Critical, RiskTier::High, RiskTier::Standard]
        .into_iter()
        .map(|tier| {
            let count = alerts
                .iter()
                .filter(|a| RiskTier::of(a.risk_score) == tier)
                .count();
            let percent = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            TierCount {
                tier,
                label: tier.label(),
                count,
                percent,
            }
        })
        .collect()
}

/// Alerts still awaiting triage.
pub fn open_count<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> usize {
    alerts.into_iter().filter(|a| a.status == "Open").count()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub time: Option<String>,
    pub account: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub amount: String,
    pub risk: &'static str,
}

/// The latest alerts condensed for the live activity feed.
pub fn recent_activity(alerts: &[Alert]) -> Vec<ActivityEntry> {
    alerts
        .iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|a| ActivityEntry {
            time: a.time.clone(),
            account: a.account_id.clone(),
            alert_type: a.alert_type.clone(),
            amount: a.amount.clone(),
            risk: if a.risk_score > CRITICAL_THRESHOLD {
                "high"
            } else {
                "medium"
            },
        })
        .collect()
}
