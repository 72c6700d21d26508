use std::sync::Arc;

use serde::Serialize;

use crate::alerts::Alert;
use crate::analysis::{self, AnalysisContext, Transaction};
use crate::client::types::AccountProfile;
use crate::client::BackendClient;
use crate::session::Session;

/// Everything the deep-analysis view shows for one alert.
#[derive(Debug, Clone, Serialize)]
pub struct InvestigationContext {
    pub subject: Alert,
    pub profile: AccountProfile,
    /// True when the account endpoint failed and `profile` was built from the alert.
    pub profile_fallback: bool,
    pub transactions: Vec<Transaction>,
    pub analysis: AnalysisContext,
}

impl InvestigationContext {
    pub fn new(
        subject: Alert,
        profile: AccountProfile,
        profile_fallback: bool,
        transactions: Vec<Transaction>,
    ) -> Self {
        let analysis = analysis::derive(&transactions, &subject.account_id);
        Self {
            subject,
            profile,
            profile_fallback,
            transactions,
            analysis,
        }
    }
}

/// Minimal profile shown when the account endpoint is unavailable.
pub fn fallback_profile(alert: &Alert) -> AccountProfile {
    let name = if alert.account_name.is_empty() {
        "Unknown Subject".to_string()
    } else {
        alert.account_name.clone()
    };
    AccountProfile {
        account_id: alert.account_id.clone(),
        name,
        risk_score: Some(alert.risk_score),
        ..Default::default()
    }
}

/// Assembles investigation contexts and tracks the last investigated alert.
pub struct Investigator {
    client: BackendClient,
    session: Arc<Session>,
}

impl Investigator {
    pub fn new(client: BackendClient, session: Arc<Session>) -> Self {
        Self { client, session }
    }

    /// Load the account profile and transactions for `alert` and derive the
    /// fund-flow view. Backend failures degrade to fallbacks; this never fails.
    pub async fn investigate(&self, alert: Alert) -> InvestigationContext {
        if let Err(e) = self.session.remember_alert(&alert) {
            tracing::warn!(error = %e, "Failed to persist last investigated alert");
        }

        let account_id = alert.account_id.as_str();
        tracing::info!(account_id, alert_id = %alert.alert_id, "Fetching deep analysis");

        let (profile, transactions) = futures::future::join(
            self.client.account(account_id),
            self.client.account_transactions(account_id),
        )
        .await;

        let (profile, profile_fallback) = match profile {
            Ok(profile) => (profile, false),
            Err(e) => {
                tracing::warn!(account_id, error = %e, "Account lookup failed, using alert data");
                (fallback_profile(&alert), true)
            }
        };

        let transactions = transactions.unwrap_or_else(|e| {
            tracing::warn!(account_id, error = %e, "Transaction fetch failed, continuing without");
            Vec::new()
        });

        tracing::debug!(account_id, transactions = transactions.len(), "Deep analysis loaded");
        InvestigationContext::new(alert, profile, profile_fallback, transactions)
    }

    /// Re-open the last investigated alert, if one was recorded.
    pub async fn resume(&self) -> Option<InvestigationContext> {
        let alert = self.session.last_investigated()?;
        Some(self.investigate(alert).await)
    }
}
