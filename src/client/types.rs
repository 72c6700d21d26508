use serde::{Deserialize, Serialize};

use crate::analysis::Transaction;

// ============================================================
// Authentication
// ============================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GoogleLoginRequest<'a> {
    pub token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Response of the signup and Google login endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub tokens: TokenPair,
    pub user: UserProfile,
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================
// Accounts
// ============================================================

/// Account profile shown at the top of an investigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub account_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub open_date: Option<String>,
    #[serde(default)]
    pub avg_balance: Option<String>,
    #[serde(default)]
    pub total_transactions: Option<i64>,
    #[serde(default)]
    pub flagged_transactions: Option<i64>,
    #[serde(default)]
    pub risk_history: Vec<serde_json::Value>,
    #[serde(default)]
    pub counterparties: Vec<serde_json::Value>,
    #[serde(default)]
    pub recent_activity: Vec<Transaction>,
    /// Only present on profiles synthesized from an alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdate<'a> {
    pub status: &'a str,
}

// ============================================================
// Background jobs
// ============================================================

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub task_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(default)]
    pub task_id: String,
    pub status: TaskState,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub processed_records: u64,
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================
// SAR
// ============================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SarResponse {
    pub report: String,
}
