mod common;

use std::sync::Arc;

use serde_json::{json, Value};

use aml_dashboard::api::{self, AppState};
use aml_dashboard::client::TokenProvider;
use aml_dashboard::session::{MemorySessionStore, Session, SessionState};

struct Dashboard {
    url: String,
    http: reqwest::Client,
    backend: common::Running,
}

async fn spawn_dashboard(login: bool) -> Dashboard {
    let backend = common::spawn().await;
    let session = Arc::new(
        Session::init(Arc::new(MemorySessionStore::new(SessionState::default()))).unwrap(),
    );
    let client = backend.client(Some(session.clone() as Arc<dyn TokenProvider>));
    if login {
        session
            .login(&client, "analyst", common::PASSWORD)
            .await
            .unwrap();
    }

    let app = api::router(AppState::new(client, session));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Dashboard {
        url: format!("http://{}/api/v1", addr),
        http: reqwest::Client::new(),
        backend,
    }
}

impl Dashboard {
    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.http.get(format!("{}{}", self.url, path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn post(&self, path: &str) -> (u16, Value) {
        let resp = self.http.post(format!("{}{}", self.url, path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

#[tokio::test]
async fn test_health_reports_session() {
    let dash = spawn_dashboard(true).await;
    let (status, body) = dash.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["username"], "analyst");
    assert_eq!(body["backend"], dash.backend.base_url.as_str());
}

#[tokio::test]
async fn test_alerts_endpoint_applies_filters() {
    let dash = spawn_dashboard(true).await;

    let (status, body) = dash.get("/alerts").await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 3);
    assert_eq!(body["open_count"], 1);

    let (_, body) = dash.get("/alerts?risk=high&status=under-review").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["alerts"][0]["accountId"], "ACC200");

    let (_, body) = dash.get("/alerts?search=zzz").await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["open_count"], 0);
}

#[tokio::test]
async fn test_unauthenticated_calls_return_401() {
    let dash = spawn_dashboard(false).await;
    let (status, body) = dash.get("/alerts").await;
    assert_eq!(status, 401);
    assert!(body["error"].as_str().unwrap().contains("not valid"));
}

#[tokio::test]
async fn test_stats_combines_backend_and_tiers() {
    let dash = spawn_dashboard(true).await;
    let (status, body) = dash.get("/stats").await;
    assert_eq!(status, 200);
    assert_eq!(body["stats"]["critical_alerts"], 1);
    assert_eq!(body["tiers"][0]["tier"], "critical");
    assert_eq!(body["tiers"][0]["count"], 1);
    assert_eq!(body["recent_activity"][0]["risk"], "high");
    assert_eq!(body["recent_activity"][1]["risk"], "medium");
}

#[tokio::test]
async fn test_status_update_round_trip() {
    let dash = spawn_dashboard(true).await;
    let resp = dash
        .http
        .patch(format!("{}/alerts/1", dash.url))
        .json(&json!({"status": "Closed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Case 1 closed.");

    let resp = dash
        .http
        .patch(format!("{}/alerts/1", dash.url))
        .json(&json!({"status": "  "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let recorded = dash.backend.backend.recorded.lock().unwrap();
    assert_eq!(recorded.status_updates, vec![(1, "Closed".to_string())]);
}

#[tokio::test]
async fn test_investigate_then_resume() {
    let dash = spawn_dashboard(true).await;

    let (status, _) = dash.get("/investigation").await;
    assert_eq!(status, 404);

    let (status, body) = dash.post("/alerts/1/investigate").await;
    assert_eq!(status, 200);
    assert_eq!(body["profile"]["name"], "Asha Traders");
    assert_eq!(body["analysis"]["sources"], json!(["ACC900"]));
    assert_eq!(body["analysis"]["timeline"].as_array().unwrap().len(), 14);

    let (status, body) = dash.get("/investigation").await;
    assert_eq!(status, 200);
    assert_eq!(body["subject"]["alert_id"], "ALT-2024-001");

    let (status, _) = dash.post("/alerts/99/investigate").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_sar_and_job_endpoints() {
    let dash = spawn_dashboard(true).await;

    let (status, body) = dash.post("/alerts/1/sar").await;
    assert_eq!(status, 200);
    assert_eq!(body["file_name"], "SAR_Report_ACC100.txt");
    assert_eq!(body["alert_id"], "ALT-2024-001");
    assert!(body["report"].as_str().unwrap().contains("NARRATIVE"));

    let (status, body) = dash.get("/jobs/task-bad").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "Processing");
    let (_, body) = dash.get("/jobs/task-bad").await;
    assert_eq!(body["status"], "Failed");
    assert_eq!(body["error"], "Unreadable sheet");
}
