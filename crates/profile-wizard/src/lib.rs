pub mod config;
pub mod controller;
pub mod error;
pub mod ports;
pub mod session;
pub mod submission;
pub mod summary;

pub use config::{ConfigError, DEFAULT_SUBMIT_TIMEOUT_MS, WizardConfig};
pub use controller::{NavigationView, StepStatus, StepperItem, WizardController};
pub use error::{LoadError, SaveError, UploadError, WizardError};
pub use ports::{MemoryProfileStore, PictureUpload, PictureUploader, ProfileSource, ProfileStore};
pub use session::{FormSession, NextStep, SessionState};
pub use submission::{
    PendingSubmission, SubmissionCoordinator, SubmissionFailure, SubmissionGate, SubmissionOutcome,
};
pub use summary::ValidationSummary;

pub use profile_spec;
