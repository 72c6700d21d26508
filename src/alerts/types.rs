use serde::{Deserialize, Serialize};

/// An alert raised by the backend's risk engine for one account.
///
/// `id` is the backend primary key (used by status updates and SAR generation);
/// `alert_id` is the human-facing case reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    #[serde(default)]
    pub alert_id: String,
    #[serde(rename = "accountId", default)]
    pub account_id: String,
    #[serde(rename = "accountName", default)]
    pub account_name: String,
    /// Comma-separated typology labels, e.g. "Structuring, Money Mule".
    #[serde(rename = "type", default)]
    pub alert_type: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub risk_score: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub transactions_count: Option<i64>,
    /// Daily volume over the last seven days.
    #[serde(default)]
    pub trend: Option<Vec<f64>>,
}

impl Alert {
    /// The typology labels this alert was raised for.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.alert_type
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Aggregate figures for the overview screen, as computed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub critical_alerts: i64,
    pub flagged_accounts: i64,
    pub suspicious_volume: String,
    pub detection_rate: String,
    pub trend: Vec<TrendPoint>,
    pub distribution: Vec<NamedCount>,
    pub acc_type_dist: Vec<NamedCount>,
    pub impact_feed: Vec<ImpactEntry>,
    pub summary: StatsSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactEntry {
    pub id: i64,
    pub account: String,
    pub name: String,
    pub reason: String,
    pub amount: String,
    pub time: String,
    pub severity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSummary {
    pub total_accounts: i64,
    pub total_transactions: i64,
    pub total_alerts: i64,
}
