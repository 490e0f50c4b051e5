use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the video generation workflow.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No API key is configured")]
    Configuration,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("The API key was rejected by the video service: {message}")]
    InvalidCredential { message: String },

    #[error("Network error while talking to the video service: {message}")]
    Transport { message: String },

    #[error("The generation job finished without producing a video")]
    EmptyResult,

    #[error("Video generation was cancelled")]
    Cancelled,

    #[error("Unexpected response from the video service: {0}")]
    UnexpectedResponse(#[from] serde_json::Error),

    /// Catch-all for remote failures that need no special handling
    #[error("Video service error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl GenerationError {
    /// Classifies a non-success HTTP response from the remote service.
    ///
    /// The service reports an unknown API key either via the status code
    /// or with a "Requested entity was not found" message on an otherwise
    /// generic status.
    pub fn from_api_failure(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();

        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || message.contains("Requested entity was not found")
        {
            Self::InvalidCredential { message }
        } else {
            Self::Api {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Transient failures are retried by the poll loop instead of
    /// terminating the generation.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport {
            message: e.to_string(),
        }
    }
}
