use crate::controller::{SubmissionController, SubmissionState};

/// What the form should show for a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// Show a busy indicator.
    pub busy: bool,
    pub submit_enabled: bool,
    /// Validation reason or failure message.
    pub message: Option<String>,
    /// Address of a playable video.
    pub video_url: Option<String>,
    /// Script text the service generated for the video, if any.
    pub script: Option<String>,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            busy: false,
            submit_enabled: true,
            message: None,
            video_url: None,
            script: None,
        }
    }
}

/// Pure projection of the controller state. The latest state always wins.
pub fn present(state: &SubmissionState) -> Presentation {
    match state {
        SubmissionState::Idle => Presentation::default(),
        SubmissionState::Invalid(reason) => Presentation {
            message: Some(reason.to_string()),
            ..Presentation::default()
        },
        SubmissionState::Submitting { .. } => Presentation {
            busy: true,
            submit_enabled: false,
            ..Presentation::default()
        },
        SubmissionState::Succeeded(video) => Presentation {
            video_url: Some(video.url.clone()),
            script: video.script.clone(),
            ..Presentation::default()
        },
        SubmissionState::Failed(message) => Presentation {
            message: Some(message.clone()),
            ..Presentation::default()
        },
    }
}

impl SubmissionController {
    pub fn presentation(&self) -> Presentation {
        present(self.state())
    }
}
