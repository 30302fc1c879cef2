//! Remote processing service abstraction
//!
//! The controller only talks to a [`ProcessingService`]:
//! - [`HttpProcessingService`]: `POST {base}/api/process` over reqwest
//! - [`MockProcessingService`]: canned answers for offline use and tests

pub mod http;
pub mod mock;

use serde::Deserialize;
use serde_json::Value;

pub use http::HttpProcessingService;
pub use mock::{MockBehavior, MockProcessingService};

use crate::error::SubmissionError;
use crate::media::MediaFile;

/// Path of the processing endpoint, appended to the service base address.
pub const PROCESS_PATH: &str = "/api/process";

pub const VIDEO_FIELD: &str = "video";
pub const PROMPT_FIELD: &str = "prompt";
pub const REFERENCES_FIELD: &str = "references";

/// Everything sent in one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub video: MediaFile,
    pub prompt: String,
    pub references: Vec<MediaFile>,
}

/// Body of a single multipart part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartBody<'a> {
    File(&'a MediaFile),
    Text(&'a str),
}

impl ProcessRequest {
    /// Parts in wire order: video, prompt, then one `references` part per
    /// reference file under the same key.
    pub fn parts(&self) -> Vec<(&'static str, PartBody<'_>)> {
        let mut parts = Vec::with_capacity(2 + self.references.len());
        parts.push((VIDEO_FIELD, PartBody::File(&self.video)));
        parts.push((PROMPT_FIELD, PartBody::Text(&self.prompt)));
        parts.extend(
            self.references
                .iter()
                .map(|file| (REFERENCES_FIELD, PartBody::File(file))),
        );
        parts
    }
}

/// A successful answer from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Video location relative to the service base address, as returned.
    pub video_path: String,
    pub script: Option<String>,
}

#[async_trait::async_trait]
pub trait ProcessingService: Send + Sync {
    fn name(&self) -> &str;

    /// Base address that relative video paths are resolved against.
    fn base_url(&self) -> &str;

    /// Send one request. Implementations must not retry.
    async fn process(&self, request: &ProcessRequest) -> Result<ProcessOutput, SubmissionError>;
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    video_url: Option<String>,
    script: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: Option<Value>,
}

/// Turn a raw HTTP status and body into an outcome.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<ProcessOutput, SubmissionError> {
    if !(200..300).contains(&status) {
        return Err(SubmissionError::Remote {
            status,
            detail: error_detail(body),
            message: format!("Request failed with status code {}", status),
        });
    }

    let response: ProcessResponse = serde_json::from_slice(body)
        .map_err(|e| SubmissionError::malformed(format!("Invalid response JSON: {}", e)))?;

    let video_path = response
        .video_url
        .ok_or_else(|| SubmissionError::malformed("Response did not include a video_url"))?;

    Ok(ProcessOutput {
        video_path,
        script: response.script,
    })
}

/// `detail` is usually a string; request validation errors send a list of
/// objects with a `msg` each, which are joined.
fn error_detail(body: &[u8]) -> Option<String> {
    let response: ErrorResponse = serde_json::from_slice(body).ok()?;

    match response.detail? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}
