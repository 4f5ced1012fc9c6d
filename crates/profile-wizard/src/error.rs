use profile_spec::SchemaError;
use thiserror::Error;

use crate::session::SessionState;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("session is {0} and no longer accepts changes")]
    SessionClosed(SessionState),
    #[error("no profile picture uploader is configured")]
    NoUploader,
    #[error("profile picture upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error("loading the existing profile failed: {0}")]
    Load(#[from] LoadError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Rejection reported by a profile store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SaveError {
    pub message: String,
}

impl SaveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UploadError {
    pub message: String,
}

impl UploadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    pub message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
