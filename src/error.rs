use thiserror::Error;

/// Banner text when the backend gives no reason for a failed run.
pub const GENERIC_TRAIN_FAILURE: &str = "Training failed";

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("request to training service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("training service returned HTTP {status}")]
    HttpStatus { status: u16, message: Option<String> },

    #[error("training service reported status {status:?}")]
    Rejected {
        status: Option<String>,
        message: Option<String>,
    },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("a training run is already in progress")]
    TrainingInProgress,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DashboardError {
    /// Text shown in the danger banner. Server-supplied messages win.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::HttpStatus {
                message: Some(message),
                ..
            }
            | DashboardError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            _ => GENERIC_TRAIN_FAILURE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
