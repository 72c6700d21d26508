use serde::{Deserialize, Serialize};

use crate::alerts::summary::{ActivityEntry, TierCount};
use crate::alerts::{Alert, DashboardStats};

// ============================================================
// Request bodies
// ============================================================

#[derive(Debug, Deserialize)]
pub struct StatusUpdateBody {
    pub status: String,
}

// ============================================================
// Response types
// ============================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub authenticated: bool,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub total: usize,
    pub open_count: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: DashboardStats,
    pub tiers: Vec<TierCount>,
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub id: i64,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SarResponse {
    pub alert_id: String,
    pub file_name: String,
    pub report: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
