//! Collaborators the wizard calls out to: persistence, picture uploads and
//! loading an existing profile for edit mode.

use async_trait::async_trait;
use profile_spec::FormValues;
use tokio::sync::Mutex;

use crate::error::{LoadError, SaveError, UploadError};

/// Persists a completed profile.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn save_profile(&self, values: &FormValues) -> Result<(), SaveError>;
}

/// Picture chosen by the user on the motivation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Stores a profile picture and returns its public URL.
#[async_trait]
pub trait PictureUploader: Send + Sync {
    async fn upload_profile_picture(&self, upload: PictureUpload) -> Result<String, UploadError>;
}

/// Supplies the values of an existing profile; `None` starts a fresh one.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn load_initial_data(&self) -> Result<Option<FormValues>, LoadError>;
}

#[async_trait]
impl ProfileSource for FormValues {
    async fn load_initial_data(&self) -> Result<Option<FormValues>, LoadError> {
        Ok(Some(self.clone()))
    }
}

/// In-memory store that keeps every saved snapshot.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    saved: Mutex<Vec<FormValues>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn saved(&self) -> Vec<FormValues> {
        self.saved.lock().await.clone()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn save_profile(&self, values: &FormValues) -> Result<(), SaveError> {
        self.saved.lock().await.push(values.clone());
        Ok(())
    }
}
