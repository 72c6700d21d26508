use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::alerts::Alert;
use crate::client::types::UserProfile;

/// Everything the dashboard keeps between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    /// Survives logout so the analysis view can resume where it left off.
    #[serde(default)]
    pub last_investigated_alert: Option<Alert>,
}

/// Durable backing storage for [`SessionState`].
pub trait SessionStore: Send + Sync {
    fn load(&self) -> eyre::Result<SessionState>;
    fn save(&self, state: &SessionState) -> eyre::Result<()>;
}

/// JSON file on local disk. A missing file is an empty session.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> eyre::Result<SessionState> {
        if !self.path.exists() {
            return Ok(SessionState::default());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            eyre::eyre!("Failed to read session file '{}': {}", self.path.display(), e)
        })?;
        serde_json::from_str(&content).map_err(|e| {
            eyre::eyre!("Failed to parse session file '{}': {}", self.path.display(), e)
        })
    }

    fn save(&self, state: &SessionState) -> eyre::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(state)?;
        // Replaced atomically; readers never see a partial file.
        let tmp = self.path.with_extension("json.tmp");
        write_private(&tmp, content.as_bytes()).map_err(|e| {
            eyre::eyre!("Failed to write session file '{}': {}", tmp.display(), e)
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            eyre::eyre!("Failed to write session file '{}': {}", self.path.display(), e)
        })?;
        Ok(())
    }
}

/// Write `bytes` to a fresh file readable only by the owner. The file holds
/// bearer and refresh tokens.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    // A leftover file would keep its old mode.
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Process-local store; nothing outlives the process.
#[derive(Default)]
pub struct MemorySessionStore {
    state: Mutex<SessionState>,
}

impl MemorySessionStore {
    pub fn new(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> eyre::Result<SessionState> {
        Ok(self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, state: &SessionState) -> eyre::Result<()> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state.clone();
        Ok(())
    }
}
