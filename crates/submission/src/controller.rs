//! Submission lifecycle
//!
//! `Idle -> Invalid | Submitting -> Succeeded | Failed`, driven by named
//! transitions:
//! - [`SubmissionController::begin_submit`] validates and snapshots the inputs
//! - [`PendingSubmission::dispatch`] performs the single network call
//! - [`SubmissionController::complete`] applies the outcome
//!
//! `dispatch` owns its snapshot and does not borrow the controller, so a UI can
//! spawn it and hand the [`Completion`] back later. Completions are matched
//! against the current [`AttemptId`]; anything else is dropped.

use crate::error::{SubmissionError, ValidationError};
use crate::inputs::InputCollector;
use crate::media::MediaFile;
use crate::service::{ProcessRequest, ProcessingService};
use std::fmt;
use tracing::{debug, info, warn};

/// Monotonically increasing attempt identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(u64);

impl AttemptId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The generated video, addressed absolutely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedVideo {
    pub url: String,
    pub script: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Invalid(ValidationError),
    Submitting {
        attempt: AttemptId,
    },
    Succeeded(GeneratedVideo),
    Failed(String),
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting { .. })
    }
}

/// Settled result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub attempt: AttemptId,
    pub outcome: Result<GeneratedVideo, SubmissionError>,
}

/// An attempt that has started but not been dispatched.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    attempt: AttemptId,
    request: ProcessRequest,
}

impl PendingSubmission {
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn request(&self) -> &ProcessRequest {
        &self.request
    }

    /// Issue exactly one request and resolve the returned relative path
    /// against the service base address by plain concatenation.
    pub async fn dispatch(self, service: &dyn ProcessingService) -> Completion {
        debug!(
            "Dispatching attempt {} to {} service",
            self.attempt,
            service.name()
        );

        let outcome = service
            .process(&self.request)
            .await
            .map(|output| GeneratedVideo {
                url: format!("{}{}", service.base_url(), output.video_path),
                script: output.script,
            });

        match &outcome {
            Ok(video) => info!("Attempt {} produced {}", self.attempt, video.url),
            Err(e) => warn!("Attempt {} failed: {}", self.attempt, e),
        }

        Completion {
            attempt: self.attempt,
            outcome,
        }
    }
}

/// Owns the input fields and the lifecycle state.
#[derive(Debug, Default)]
pub struct SubmissionController {
    inputs: InputCollector,
    state: SubmissionState,
    last_attempt: u64,
}

impl SubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs(inputs: InputCollector) -> Self {
        Self {
            inputs,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn inputs(&self) -> &InputCollector {
        &self.inputs
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    pub fn set_video(&mut self, file: MediaFile) {
        self.inputs.set_video(file);
        self.input_edited();
    }

    pub fn clear_video(&mut self) {
        self.inputs.clear_video();
        self.input_edited();
    }

    pub fn set_references(&mut self, files: impl IntoIterator<Item = MediaFile>) {
        self.inputs.set_references(files);
        self.input_edited();
    }

    pub fn set_prompt(&mut self, text: impl Into<String>) {
        self.inputs.set_prompt(text);
        self.input_edited();
    }

    // A validation reason goes stale once the user edits; other states are
    // only replaced by the next attempt.
    fn input_edited(&mut self) {
        if matches!(self.state, SubmissionState::Invalid(_)) {
            self.state = SubmissionState::Idle;
        }
    }

    /// Start an attempt.
    ///
    /// Returns `None` without touching the network when an attempt is already
    /// in flight or when the inputs are invalid (the latter moves to
    /// `Invalid`).
    pub fn begin_submit(&mut self) -> Option<PendingSubmission> {
        if let SubmissionState::Submitting { attempt } = self.state {
            debug!("Ignoring submit while attempt {} is in flight", attempt);
            return None;
        }

        let request = match self.inputs.build_request() {
            Ok(request) => request,
            Err(reason) => {
                warn!("Submission rejected: {}", reason);
                self.state = SubmissionState::Invalid(reason);
                return None;
            }
        };

        self.last_attempt += 1;
        let attempt = AttemptId(self.last_attempt);
        self.state = SubmissionState::Submitting { attempt };

        info!(
            "Starting attempt {} ({} references, prompt {} chars)",
            attempt,
            request.references.len(),
            request.prompt.chars().count()
        );

        Some(PendingSubmission { attempt, request })
    }

    /// Apply a settled attempt. Returns `false` when the completion belongs
    /// to an attempt that is no longer current.
    pub fn complete(&mut self, completion: Completion) -> bool {
        match self.state {
            SubmissionState::Submitting { attempt } if attempt == completion.attempt => {}
            _ => {
                debug!("Dropping stale completion for attempt {}", completion.attempt);
                return false;
            }
        }

        self.state = match completion.outcome {
            Ok(video) => SubmissionState::Succeeded(video),
            Err(err) => SubmissionState::Failed(err.failure_message()),
        };
        true
    }

    /// Abandon whatever is shown or in flight and return to `Idle`. A request
    /// already sent keeps running; its completion will be dropped.
    pub fn reset(&mut self) {
        if let SubmissionState::Submitting { attempt } = self.state {
            info!("Abandoning attempt {}", attempt);
        }
        self.state = SubmissionState::Idle;
    }

    /// Validate, send and settle in one go.
    pub async fn submit(&mut self, service: &dyn ProcessingService) -> &SubmissionState {
        if let Some(pending) = self.begin_submit() {
            let completion = pending.dispatch(service).await;
            self.complete(completion);
        }
        &self.state
    }
}
