use std::path::{Path, PathBuf};

use async_trait::async_trait;
use huurly_profile_wizard::{ProfileStore, SaveError};
use profile_spec::FormValues;
use tracing::info;

/// Writes each saved profile as pretty-printed JSON to one file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    async fn save_profile(&self, values: &FormValues) -> Result<(), SaveError> {
        let payload = serde_json::to_vec_pretty(values)
            .map_err(|err| SaveError::new(format!("failed to encode profile: {err}")))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                SaveError::new(format!("failed to create {}: {err}", parent.display()))
            })?;
        }
        tokio::fs::write(&self.path, payload).await.map_err(|err| {
            SaveError::new(format!("failed to write {}: {err}", self.path.display()))
        })?;
        info!(
            path = %self.path.display(),
            field_count = values.len(),
            "profile written"
        );
        Ok(())
    }
}
