use thiserror::Error;

/// Shown when a failure carries neither a `detail` nor any error text.
pub const GENERIC_FAILURE_MESSAGE: &str = "Unknown error";

/// Local input problems, detected before any network activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Upload a video")]
    MissingVideo,
    #[error("Enter a prompt")]
    MissingPrompt,
}

/// Failures of a dispatched request.
///
/// All variants end up as a single `Failed(message)` state; use
/// [`SubmissionError::failure_message`] to get the text to show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The request could not be sent or no response came back.
    #[error("{0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Remote {
        status: u16,
        detail: Option<String>,
        message: String,
    },

    /// A 2xx answer without the expected `video_url`.
    #[error("{0}")]
    MalformedResponse(String),
}

impl SubmissionError {
    pub fn transport(msg: impl Into<String>) -> Self {
        SubmissionError::Transport(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        SubmissionError::MalformedResponse(msg.into())
    }

    /// Structured `detail` from the service first, then the raw error text,
    /// then [`GENERIC_FAILURE_MESSAGE`].
    pub fn failure_message(&self) -> String {
        let (detail, text) = match self {
            SubmissionError::Transport(text) | SubmissionError::MalformedResponse(text) => {
                (None, text.as_str())
            }
            SubmissionError::Remote {
                detail, message, ..
            } => (detail.as_deref(), message.as_str()),
        };

        detail
            .filter(|d| !d.is_empty())
            .or_else(|| Some(text).filter(|t| !t.is_empty()))
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string()
    }
}
