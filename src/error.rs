/// Error taxonomy for the studio engine
///
/// Local invariant violations (unknown steps, duplicate transitions) are caught by the
/// graph adapter before they reach the model. Collaborator failures (remote API, result
/// stream, local storage) are reported to the operator and never partially applied.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    // Domain model
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Step already exists: {0}")]
    DuplicateStep(String),

    #[error("Transition already exists: {source_uid} -> {destination_uid}")]
    DuplicateTransition {
        source_uid: String,
        destination_uid: String,
    },

    #[error("Unknown transition: {0}")]
    UnknownTransition(String),

    #[error("Workflow cannot be saved without a starting step")]
    MissingStart,

    #[error("No workflow is loaded")]
    NoWorkflowLoaded,

    // Catalog
    #[error("App not found in catalog: {0}")]
    UnknownApp(String),

    #[error("Action not found in catalog: {app}/{action}")]
    UnknownAction { app: String, action: String },

    // Collaborators
    #[error("Remote request failed: {0}")]
    RemoteFailure(String),

    #[error("Result stream failed: {0}")]
    StreamFailure(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for StudioError {
    fn from(e: reqwest::Error) -> Self {
        StudioError::RemoteFailure(e.to_string())
    }
}

impl From<sqlx::Error> for StudioError {
    fn from(e: sqlx::Error) -> Self {
        StudioError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;
