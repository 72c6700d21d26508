pub mod poller;

use std::path::Path;

use crate::client::types::UploadResponse;
use crate::client::{BackendClient, ClientError};
use crate::session::Session;

pub use poller::{JobOutcome, JobPoller};

/// File extensions the backend's analysis job can read.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

/// Submit `path` for background analysis and return the task to poll.
///
/// Requires an authenticated session; without one the stale session is
/// cleared and [`ClientError::MissingCredential`] is returned before any
/// upload is attempted.
pub async fn start_analysis(
    client: &BackendClient,
    session: &Session,
    path: &Path,
) -> eyre::Result<UploadResponse> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(eyre::eyre!(
            "Unsupported file '{}': expected one of {}",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        ));
    }

    if !session.is_authenticated() {
        session.logout()?;
        return Err(ClientError::MissingCredential.into());
    }

    tracing::info!(file = %path.display(), "Starting analysis");
    let response = match client.upload_file(path).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(file = %path.display(), error = %e, "Upload failed");
            return Err(eyre::Report::new(e).wrap_err("Upload failed"));
        }
    };

    tracing::info!(task_id = %response.task_id, "Analysis started in background");
    Ok(response)
}
