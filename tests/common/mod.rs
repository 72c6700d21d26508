//! In-process stand-in for the monitoring backend, bound to an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use aml_dashboard::client::{BackendClient, ClientOptions, TokenProvider};

pub const ACCESS_TOKEN: &str = "tok-1";
pub const REFRESH_TOKEN: &str = "ref-1";
pub const PASSWORD: &str = "secret";
pub const TAKEN_USERNAME: &str = "taken";
pub const SLOW_STATUS_DELAY: Duration = Duration::from_millis(40);
pub const GOOGLE_ID_TOKEN: &str = "google-id-token";

#[derive(Default)]
pub struct Recorded {
    pub status_updates: Vec<(i64, String)>,
    pub uploads: Vec<usize>,
    pub polls: HashMap<String, usize>,
    pub sar_requests: Vec<i64>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    pub recorded: Arc<Mutex<Recorded>>,
}

pub struct Running {
    pub base_url: String,
    pub backend: FakeBackend,
}

impl Running {
    pub fn client(&self, tokens: Option<Arc<dyn TokenProvider>>) -> BackendClient {
        let mut options = ClientOptions::new(self.base_url.clone());
        if let Some(tokens) = tokens {
            options = options.with_token_provider(tokens);
        }
        BackendClient::new(options).unwrap()
    }

    pub fn polls(&self, task_id: &str) -> usize {
        let recorded = self.backend.recorded.lock().unwrap();
        recorded.polls.get(task_id).copied().unwrap_or(0)
    }
}

pub async fn spawn() -> Running {
    let backend = FakeBackend::default();
    let app = Router::new()
        .route("/api/login/", post(login))
        .route("/api/signup/", post(signup))
        .route("/api/google-login/", post(google_login))
        .route("/api/token/refresh/", post(refresh))
        .route("/api/alerts/", get(alerts))
        .route("/api/alerts/stats/", get(stats))
        .route("/api/alerts/{id}/", patch(update_status))
        .route("/api/accounts/{id}/", get(account))
        .route("/api/accounts/{id}/transactions/", get(transactions))
        .route("/api/upload/", post(upload))
        .route("/api/task-status/{id}/", get(task_status))
        .route("/api/generate-sar/{id}/", post(generate_sar))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Running {
        base_url: format!("http://{}", addr),
        backend,
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", ACCESS_TOKEN))
}

pub fn alert_fixtures() -> Value {
    json!([
        {
            "id": 1, "alert_id": "ALT-2024-001", "accountId": "ACC100",
            "accountName": "Asha Traders", "type": "Structuring, Money Mule",
            "amount": "₹4,50,000", "risk_score": 95, "status": "Open",
            "date": "2024-03-01", "time": "10:02"
        },
        {
            "id": 2, "alert_id": "ALT-2024-002", "accountId": "ACC200",
            "accountName": "Nova Exports", "type": "Layering",
            "amount": "₹90,000", "risk_score": 80, "status": "Under Review"
        },
        {
            "id": 3, "alert_id": "ALT-2024-003", "accountId": "ACC404",
            "accountName": "Ghost Holdings", "type": "Rapid Movement",
            "amount": "₹12,000", "risk_score": 40, "status": "Closed"
        }
    ])
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == PASSWORD {
        Json(json!({"access": ACCESS_TOKEN, "refresh": REFRESH_TOKEN})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

fn auth_response(username: &str, email: &str, message: &str) -> Value {
    json!({
        "tokens": {"access": ACCESS_TOKEN, "refresh": REFRESH_TOKEN},
        "user": {"username": username, "email": email},
        "message": message
    })
}

async fn signup(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    if username == TAKEN_USERNAME {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Username already exists"})),
        )
            .into_response();
    }
    let email = body["email"].as_str().unwrap_or_default();
    (
        StatusCode::CREATED,
        Json(auth_response(username, email, "User created successfully")),
    )
        .into_response()
}

async fn google_login(Json(body): Json<Value>) -> Response {
    if body["token"] != GOOGLE_ID_TOKEN {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid Google token"})),
        )
            .into_response();
    }
    Json(auth_response(
        "g.analyst",
        "g.analyst@bank.example",
        "Google login successful",
    ))
    .into_response()
}

async fn refresh(Json(body): Json<Value>) -> Response {
    if body["refresh"] == REFRESH_TOKEN {
        Json(json!({"access": ACCESS_TOKEN})).into_response()
    } else {
        unauthorized()
    }
}

async fn alerts(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(alert_fixtures()).into_response()
}

async fn stats(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "critical_alerts": 1,
        "flagged_accounts": 3,
        "suspicious_volume": "₹5.5L",
        "detection_rate": "94.2%",
        "summary": {"total_accounts": 50, "total_transactions": 1200, "total_alerts": 3}
    }))
    .into_response()
}

async fn update_status(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let Some(status) = body["status"].as_str() else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "status required"})))
            .into_response();
    };
    backend
        .recorded
        .lock()
        .unwrap()
        .status_updates
        .push((id, status.to_string()));
    Json(json!({"id": id, "status": status})).into_response()
}

async fn account(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != "ACC100" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Account not found"})))
            .into_response();
    }
    Json(json!({
        "account_id": "ACC100",
        "name": "Asha Traders",
        "type": "Current",
        "avg_balance": "₹1,20,000",
        "total_transactions": 3,
        "flagged_transactions": 2,
        "risk_score": 95
    }))
    .into_response()
}

async fn transactions(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != "ACC100" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Account not found"})))
            .into_response();
    }
    Json(json!([
        {
            "id": 1, "date_time": "2024-03-01T00:00:00Z", "type": "Deposit",
            "amount": "₹45000", "related_account": "ACC900", "flag": true
        },
        {
            "id": 2, "date_time": "2024-03-01T12:00:00Z", "type": "Withdrawal",
            "amount": "₹44000", "related_account": "ACC901", "flag": true
        },
        {
            "id": 3, "date_time": "2024-03-02T00:00:00Z", "type": "Deposit",
            "amount": "₹5000", "related_account": "ACC900", "flag": false
        }
    ]))
    .into_response()
}

async fn upload(State(backend): State<FakeBackend>, headers: HeaderMap, body: Bytes) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    backend.recorded.lock().unwrap().uploads.push(body.len());
    (
        StatusCode::ACCEPTED,
        Json(json!({"task_id": "task-ok", "message": "File uploaded, processing started"})),
    )
        .into_response()
}

/// `task-ok` completes on its third poll, `task-bad` fails on its second,
/// `task-flaky` errors once before completing, anything else never settles.
/// `task-slow` answers after [`SLOW_STATUS_DELAY`].
async fn task_status(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let poll = {
        let mut recorded = backend.recorded.lock().unwrap();
        let count = recorded.polls.entry(id.clone()).or_default();
        *count += 1;
        *count
    };
    if id == "task-slow" {
        tokio::time::sleep(SLOW_STATUS_DELAY).await;
    }

    let processing = json!({
        "task_id": id, "status": "Processing", "progress": 50,
        "total_records": 100, "processed_records": 50
    });
    let body = match (id.as_str(), poll) {
        ("task-ok", n) if n >= 3 => json!({
            "task_id": id, "status": "Completed", "progress": 100,
            "total_records": 100, "processed_records": 100
        }),
        ("task-bad", n) if n >= 2 => json!({
            "task_id": id, "status": "Failed", "progress": 10,
            "error": "Unreadable sheet"
        }),
        ("task-flaky", 1) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "worker restarting").into_response();
        }
        ("task-flaky", _) => json!({"task_id": id, "status": "Completed", "progress": 100}),
        _ => processing,
    };
    Json(body).into_response()
}

async fn generate_sar(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    backend.recorded.lock().unwrap().sar_requests.push(id);
    let report = format!(
        "SUSPICIOUS ACTIVITY REPORT\nAlert pk: {}\nNARRATIVE: rapid pass-through of funds.",
        id
    );
    Json(json!({ "report": report }))
    .into_response()
}
