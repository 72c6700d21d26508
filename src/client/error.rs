use reqwest::StatusCode;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Failure talking to the monitoring backend.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("session expired or not authorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rejected by backend: {0}")]
    BadRequest(String),

    #[error("backend error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("no access token in session, please log in")]
    MissingCredential,

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// Build an error from a non-success response, preferring the backend's
    /// `{"error": ...}` or `{"detail": ...}` message over the raw body.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::from_status(status, &body)
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = backend_message(body).unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("no body").to_string()
            } else {
                body.to_string()
            }
        });

        match status.as_u16() {
            400 | 422 => Self::BadRequest(message),
            401 | 403 => Self::Unauthorized(message),
            404 => Self::NotFound(message),
            500..=599 => Self::Server {
                status: status.as_u16(),
                message,
            },
            code => Self::Http {
                status: code,
                message,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::MissingCredential)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "detail", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(String::from)
}
