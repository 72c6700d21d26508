pub mod error;
pub mod types;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::alerts::{Alert, DashboardStats};
use crate::analysis::Transaction;
use crate::config::BackendConfig;

pub use error::{ClientError, ClientResult};
use types::*;

/// Supplies the bearer credential attached to outbound requests.
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// Construction options for [`BackendClient`].
#[derive(Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout: Duration,
    /// Applied to file uploads instead of `timeout`.
    pub upload_timeout: Duration,
    pub auth_token_provider: Option<Arc<dyn TokenProvider>>,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(60),
            auth_token_provider: None,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
            auth_token_provider: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.auth_token_provider = Some(provider);
        self
    }
}

/// HTTP client for the monitoring backend. Cheap to clone.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    upload_timeout: Duration,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl BackendClient {
    pub fn new(options: ClientOptions) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(options.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            upload_timeout: options.upload_timeout,
            tokens: options.auth_token_provider,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> ClientResult<Option<HeaderValue>> {
        let Some(token) = self.tokens.as_ref().and_then(|p| p.access_token()) else {
            return Ok(None);
        };
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map(Some)
            .map_err(|e| ClientError::InvalidHeader(e.to_string()))
    }

    fn authorize(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        Ok(match self.bearer()? {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        })
    }

    async fn send(&self, request: RequestBuilder, label: &str) -> ClientResult<reqwest::Response> {
        let response = self.authorize(request)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            let err = ClientError::from_response(response).await;
            tracing::debug!(call = label, %status, error = %err, "Backend call rejected");
            return Err(err);
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        label: &str,
    ) -> ClientResult<T> {
        let response = self.send(request, label).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            what: label.to_string(),
            message: e.to_string(),
        })
    }

    // ============================================================
    // Authentication
    // ============================================================

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<TokenPair> {
        let req = self
            .http
            .post(self.url("/api/login/"))
            .json(&LoginRequest { username, password });
        self.send_json(req, "POST /api/login/").await
    }

    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> ClientResult<AuthResponse> {
        let req = self.http.post(self.url("/api/signup/")).json(&SignupRequest {
            username,
            password,
            email,
        });
        self.send_json(req, "POST /api/signup/").await
    }

    pub async fn google_login(&self, id_token: &str) -> ClientResult<AuthResponse> {
        let req = self
            .http
            .post(self.url("/api/google-login/"))
            .json(&GoogleLoginRequest { token: id_token });
        self.send_json(req, "POST /api/google-login/").await
    }

    pub async fn refresh_access(&self, refresh: &str) -> ClientResult<AccessToken> {
        let req = self
            .http
            .post(self.url("/api/token/refresh/"))
            .json(&RefreshRequest { refresh });
        self.send_json(req, "POST /api/token/refresh/").await
    }

    // ============================================================
    // Alerts
    // ============================================================

    pub async fn list_alerts(&self) -> ClientResult<Vec<Alert>> {
        let req = self.http.get(self.url("/api/alerts/"));
        self.send_json(req, "GET /api/alerts/").await
    }

    pub async fn alert_stats(&self) -> ClientResult<DashboardStats> {
        let req = self.http.get(self.url("/api/alerts/stats/"));
        self.send_json(req, "GET /api/alerts/stats/").await
    }

    pub async fn update_alert_status(&self, alert_pk: i64, status: &str) -> ClientResult<()> {
        let req = self
            .http
            .patch(self.url(&format!("/api/alerts/{}/", alert_pk)))
            .json(&StatusUpdate { status });
        self.send(req, "PATCH /api/alerts/{id}/").await?;
        Ok(())
    }

    // ============================================================
    // Accounts
    // ============================================================

    pub async fn account(&self, account_id: &str) -> ClientResult<AccountProfile> {
        let req = self
            .http
            .get(self.url(&format!("/api/accounts/{}/", account_id)));
        self.send_json(req, "GET /api/accounts/{id}/").await
    }

    pub async fn account_transactions(&self, account_id: &str) -> ClientResult<Vec<Transaction>> {
        let req = self
            .http
            .get(self.url(&format!("/api/accounts/{}/transactions/", account_id)));
        self.send_json(req, "GET /api/accounts/{id}/transactions/").await
    }

    // ============================================================
    // Background jobs
    // ============================================================

    /// Upload a transaction file for background analysis. The backend answers
    /// immediately with a task id to poll.
    pub async fn upload_file(&self, path: &Path) -> ClientResult<UploadResponse> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let req = self
            .http
            .post(self.url("/api/upload/"))
            .multipart(form)
            .timeout(self.upload_timeout);
        self.send_json(req, "POST /api/upload/").await
    }

    pub async fn task_status(&self, task_id: &str) -> ClientResult<TaskStatus> {
        let req = self
            .http
            .get(self.url(&format!("/api/task-status/{}/", task_id)));
        self.send_json(req, "GET /api/task-status/{id}/").await
    }

    // ============================================================
    // SAR
    // ============================================================

    pub async fn generate_sar(&self, alert_pk: i64) -> ClientResult<SarResponse> {
        let req = self
            .http
            .post(self.url(&format!("/api/generate-sar/{}/", alert_pk)));
        self.send_json(req, "POST /api/generate-sar/{id}/").await
    }
}
