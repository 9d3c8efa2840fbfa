use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::PersistenceError;
use crate::state::cursor::Links;
use crate::state::token::Token;
use crate::utils::constants::{STATE_FILE_MODE, STATE_FILE_NAME};

/// Pagination part of the persisted state, kept under `API` in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedApi {
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Everything that survives a restart. The password is never part of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersistedState {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub token: Token,
    #[serde(rename = "API", default)]
    pub api: PersistedApi,
}

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// State file inside the working directory.
    pub fn in_dir(work_dir: impl AsRef<Path>) -> Self {
        Self::new(work_dir.as_ref().join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best-effort load. A missing, unreadable or malformed file yields `None`.
    pub async fn load(&self) -> Option<PersistedState> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(err) => {
                debug!("no state loaded from '{}': {}", self.path.display(), err);
                return None;
            }
        };

        match serde_json::from_slice::<PersistedState>(&content) {
            Ok(state) => {
                info!("loaded state from '{}'", self.path.display());
                Some(state)
            }
            Err(err) => {
                warn!("ignoring malformed state file '{}': {}", self.path.display(), err);
                None
            }
        }
    }

    /// Writes the state atomically (tmp file + rename) with mode 0640.
    pub async fn save(&self, state: &PersistedState) -> Result<(), PersistenceError> {
        let content = serde_json::to_vec(state)?;
        let tmp = self.path.with_extension("tmp");

        write_private(&tmp, &content).await?;
        fs::rename(&tmp, &self.path).await?;

        info!("state persisted to '{}'", self.path.display());
        Ok(())
    }
}

/// Creates `path` with the state file mode, so the token is never readable
/// by others, not even before the rename.
async fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    match fs::remove_file(path).await {
        Err(err) if err.kind() != ErrorKind::NotFound => return Err(err),
        _ => {}
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(STATE_FILE_MODE);

    let mut file = options.open(path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);

    // umask may have dropped the group bit
    set_mode(path).await
}

#[cfg(unix)]
async fn set_mode(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(STATE_FILE_MODE)).await
}

#[cfg(not(unix))]
async fn set_mode(_: &Path) -> std::io::Result<()> {
    Ok(())
}
