//! HTTP processing service
//!
//! Sends the request as `multipart/form-data` to `{base}/api/process`.
//! Content type and boundary are left to reqwest.
use super::{interpret_response, PartBody, ProcessOutput, ProcessRequest, ProcessingService, PROCESS_PATH};
use crate::config::ServiceConfig;
use crate::error::SubmissionError;
use crate::media::MediaFile;
use anyhow::Result;
use reqwest::multipart::{Form, Part};
use tracing::debug;

/// HTTP client for the processing service
pub struct HttpProcessingService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpProcessingService {
    /// Create a service for the configured base address
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Use a caller-provided client
    pub fn with_client(config: &ServiceConfig, client: reqwest::Client) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, PROCESS_PATH)
    }
}

fn file_part(file: &MediaFile) -> reqwest::Result<Part> {
    Part::stream_with_length(file.data().clone(), file.len() as u64)
        .file_name(file.file_name().to_string())
        .mime_str(file.media_kind())
}

/// Build the multipart body in [`ProcessRequest::parts`] order
pub fn build_form(request: &ProcessRequest) -> reqwest::Result<Form> {
    let mut form = Form::new();
    for (name, body) in request.parts() {
        form = match body {
            PartBody::File(file) => form.part(name, file_part(file)?),
            PartBody::Text(text) => form.text(name, text.to_string()),
        };
    }
    Ok(form)
}

#[async_trait::async_trait]
impl ProcessingService for HttpProcessingService {
    fn name(&self) -> &str {
        "HTTP"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn process(&self, request: &ProcessRequest) -> Result<ProcessOutput, SubmissionError> {
        let form = build_form(request).map_err(|e| SubmissionError::transport(e.to_string()))?;
        let url = self.endpoint();

        debug!(
            "POST {} (video {} bytes, {} references)",
            url,
            request.video.len(),
            request.references.len()
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubmissionError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SubmissionError::transport(e.to_string()))?;

        debug!("Processing service answered {} ({} bytes)", status, body.len());

        interpret_response(status.as_u16(), &body)
    }
}
