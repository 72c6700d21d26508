pub mod handlers;
pub mod types;

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::client::BackendClient;
use crate::investigation::Investigator;
use crate::session::Session;

/// Shared state behind the local dashboard API.
pub struct AppState {
    pub client: BackendClient,
    pub session: Arc<Session>,
    pub investigator: Investigator,
}

impl AppState {
    pub fn new(client: BackendClient, session: Arc<Session>) -> Self {
        let investigator = Investigator::new(client.clone(), session.clone());
        Self {
            client,
            session,
            investigator,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/stats", get(handlers::stats))
        .route("/api/v1/alerts", get(handlers::list_alerts))
        .route("/api/v1/alerts/{id}", patch(handlers::update_alert_status))
        .route("/api/v1/alerts/{id}/investigate", post(handlers::investigate))
        .route("/api/v1/alerts/{id}/sar", post(handlers::generate_sar))
        .route("/api/v1/investigation", get(handlers::current_investigation))
        .route("/api/v1/jobs/{task_id}", get(handlers::job_status))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(state: AppState, host: &str, port: u16) -> eyre::Result<()> {
    let app = router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Dashboard API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
