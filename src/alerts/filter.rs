use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::types::Alert;

/// Score at or above which an alert is critical.
pub const CRITICAL_THRESHOLD: i64 = 90;
/// Score at or above which a non-critical alert is high priority.
pub const HIGH_THRESHOLD: i64 = 76;

/// Risk band selector for the alert list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskFilter {
    #[default]
    All,
    Critical,
    High,
}

impl RiskFilter {
    pub fn matches(&self, score: i64) -> bool {
        match self {
            Self::All => true,
            Self::Critical => score >= CRITICAL_THRESHOLD,
            Self::High => (HIGH_THRESHOLD..CRITICAL_THRESHOLD).contains(&score),
        }
    }
}

impl FromStr for RiskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unknown risk filter '{}', expected all, critical or high",
                other
            )),
        }
    }
}

impl fmt::Display for RiskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::Critical => "critical",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

/// Predicates applied to the alert list. Every criterion must match.
///
/// `status` and `typology` treat `None` and `"all"` as no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub risk: RiskFilter,
    /// Status slug, e.g. "open", "under-review", "closed".
    #[serde(default)]
    pub status: Option<String>,
    /// Typology label matched as a substring of the alert type.
    #[serde(default)]
    pub typology: Option<String>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        self.matches_search(alert)
            && self.risk.matches(alert.risk_score)
            && self.matches_status(alert)
            && self.matches_typology(alert)
    }

    pub fn apply<'a>(&self, alerts: &'a [Alert]) -> Vec<&'a Alert> {
        alerts.iter().filter(|a| self.matches(a)).collect()
    }

    fn matches_search(&self, alert: &Alert) -> bool {
        let term = self.search.to_lowercase();
        [&alert.account_id, &alert.alert_id, &alert.account_name]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    fn matches_status(&self, alert: &Alert) -> bool {
        match active(&self.status) {
            None => true,
            Some(wanted) => status_slug(&alert.status) == wanted,
        }
    }

    fn matches_typology(&self, alert: &Alert) -> bool {
        match active(&self.typology) {
            None => true,
            Some(label) => alert.alert_type.contains(label),
        }
    }
}

fn active(criterion: &Option<String>) -> Option<&str> {
    criterion
        .as_deref()
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
}

/// "Under Review" -> "under-review". Only the first space is replaced.
pub fn status_slug(status: &str) -> String {
    status.to_lowercase().replacen(' ', "-", 1)
}

/// Find an alert by backend key or case reference.
pub fn find<'a>(alerts: &'a [Alert], key: &str) -> Option<&'a Alert> {
    alerts
        .iter()
        .find(|a| a.alert_id == key)
        .or_else(|| {
            let id: i64 = key.parse().ok()?;
            alerts.iter().find(|a| a.id == id)
        })
}
