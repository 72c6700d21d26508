use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of equal-width buckets in the activity timeline.
pub const TIMELINE_BUCKETS: usize = 14;

/// Counterparty identifier the backend uses for cash entering the account directly.
pub const DIRECT_INTAKE: &str = "DIRECT-INTAKE";

const INFLOW_KEYWORDS: [&str; 3] = ["deposit", "incoming", "credit"];
const OUTFLOW_KEYWORDS: [&str; 3] = ["withdrawal", "outgoing", "debit"];

/// A single account movement as returned by the transaction store.
///
/// Every field is optional on the wire; the deriver tolerates partially
/// populated records rather than rejecting the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(rename = "type", default)]
    pub tx_type: Option<String>,
    /// Display-formatted amount (e.g. "₹45000"), never parsed here.
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub related_account: Option<String>,
    #[serde(default)]
    pub flag: bool,
}

/// Direction of funds relative to the investigated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    Inflow,
    Outflow,
}

impl FlowDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Inflow => &INFLOW_KEYWORDS,
            Self::Outflow => &OUTFLOW_KEYWORDS,
        }
    }
}

impl Transaction {
    /// Parse `date_time`. Accepts RFC 3339, naive date-times (taken as UTC)
    /// and bare dates (midnight UTC). Returns `None` for anything else.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.date_time.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }

        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(naive.and_utc());
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Whether the type label marks this record as moving funds in `direction`.
    /// A label can match both directions; each is checked independently.
    pub fn flows(&self, direction: FlowDirection) -> bool {
        let Some(label) = self.tx_type.as_deref() else {
            return false;
        };
        let label = label.to_lowercase();
        direction.keywords().iter().any(|kw| label.contains(kw))
    }

    /// The counterparty account, or `None` for missing, blank or direct-intake entries.
    pub fn counterparty(&self) -> Option<&str> {
        self.related_account
            .as_deref()
            .filter(|id| !id.is_empty() && *id != DIRECT_INTAKE)
    }
}

/// View-model backing the fund-flow diagram and activity histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisContext {
    /// Relative density per bucket, in [0, 100].
    pub timeline: [f64; TIMELINE_BUCKETS],
    pub sources: Vec<String>,
    pub destinations: Vec<String>,
}
