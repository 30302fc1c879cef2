//! Video submission workflow
//!
//! Collects a source video, optional reference images and a prompt, sends
//! them to the remote processing service and tracks the attempt until a
//! generated video (or an error) can be shown.

pub mod config;
pub mod controller;
pub mod error;
pub mod inputs;
pub mod media;
pub mod presenter;
pub mod service;

pub use config::{ServiceConfig, DEFAULT_SERVICE_URL, SERVICE_URL_ENV};
pub use controller::{
    AttemptId, Completion, GeneratedVideo, PendingSubmission, SubmissionController,
    SubmissionState,
};
pub use error::{SubmissionError, ValidationError, GENERIC_FAILURE_MESSAGE};
pub use inputs::InputCollector;
pub use media::MediaFile;
pub use presenter::{present, Presentation};
pub use service::{
    HttpProcessingService, MockBehavior, MockProcessingService, ProcessOutput, ProcessRequest,
    ProcessingService,
};
