use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::alerts::summary::{open_count, recent_activity, tier_breakdown};
use crate::alerts::{Alert, AlertFilter};
use crate::client::types::TaskStatus;
use crate::client::ClientError;
use crate::investigation::InvestigationContext;
use crate::sar;

use super::types::*;
use super::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: msg.into(),
        }),
    )
}

fn backend_error(e: ClientError) -> ApiError {
    let status = match &e {
        ClientError::Unauthorized(_) | ClientError::MissingCredential => StatusCode::UNAUTHORIZED,
        ClientError::NotFound(_) => StatusCode::NOT_FOUND,
        ClientError::BadRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    };
    tracing::warn!(error = %e, "Backend call failed");
    api_error(status, e.to_string())
}

async fn find_alert(state: &AppState, alert_pk: i64) -> Result<Alert, ApiError> {
    let alerts = state.client.list_alerts().await.map_err(backend_error)?;
    alerts
        .into_iter()
        .find(|a| a.id == alert_pk)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Alert {} not found", alert_pk)))
}

// ============================================================
// Health & Stats
// ============================================================

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let user = state.session.user();
    Json(HealthResponse {
        status: "ok".to_string(),
        backend: state.client.base_url().to_string(),
        authenticated: state.session.is_authenticated(),
        username: user.map(|u| u.username),
    })
}

pub async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<StatsResponse> {
    let (stats, alerts) = tokio::join!(state.client.alert_stats(), state.client.list_alerts());
    let stats = stats.map_err(backend_error)?;
    let alerts = alerts.map_err(backend_error)?;
    Ok(Json(StatsResponse {
        stats,
        tiers: tier_breakdown(&alerts),
        recent_activity: recent_activity(&alerts),
    }))
}

// ============================================================
// Alerts
// ============================================================

pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AlertFilter>,
) -> ApiResult<AlertsResponse> {
    let alerts = state.client.list_alerts().await.map_err(backend_error)?;
    let filtered = filter.apply(&alerts);
    let open = open_count(filtered.iter().copied());
    Ok(Json(AlertsResponse {
        total: filtered.len(),
        open_count: open,
        alerts: filtered.into_iter().cloned().collect(),
    }))
}

pub async fn update_alert_status(
    State(state): State<Arc<AppState>>,
    Path(alert_pk): Path<i64>,
    Json(body): Json<StatusUpdateBody>,
) -> ApiResult<StatusUpdateResponse> {
    if body.status.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "status must not be empty"));
    }
    state
        .client
        .update_alert_status(alert_pk, &body.status)
        .await
        .map_err(backend_error)?;

    let message = if body.status == "Closed" {
        format!("Case {} closed.", alert_pk)
    } else {
        format!("Status updated to {}", body.status)
    };
    tracing::info!(alert_pk, status = %body.status, "Alert status updated");
    Ok(Json(StatusUpdateResponse {
        id: alert_pk,
        status: body.status,
        message,
    }))
}

// ============================================================
// Investigation
// ============================================================

pub async fn investigate(
    State(state): State<Arc<AppState>>,
    Path(alert_pk): Path<i64>,
) -> ApiResult<InvestigationContext> {
    let alert = find_alert(&state, alert_pk).await?;
    Ok(Json(state.investigator.investigate(alert).await))
}

pub async fn current_investigation(
    State(state): State<Arc<AppState>>,
) -> ApiResult<InvestigationContext> {
    state
        .investigator
        .resume()
        .await
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "No alert has been investigated yet"))
}

// ============================================================
// SAR
// ============================================================

pub async fn generate_sar(
    State(state): State<Arc<AppState>>,
    Path(alert_pk): Path<i64>,
) -> ApiResult<SarResponse> {
    let alert = find_alert(&state, alert_pk).await?;
    let report = state
        .client
        .generate_sar(alert.id)
        .await
        .map_err(backend_error)?
        .report;
    Ok(Json(SarResponse {
        file_name: sar::report_file_name(&alert.account_id),
        alert_id: alert.alert_id,
        report,
    }))
}

// ============================================================
// Jobs
// ============================================================

pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> ApiResult<TaskStatus> {
    state
        .client
        .task_status(&task_id)
        .await
        .map(Json)
        .map_err(backend_error)
}
