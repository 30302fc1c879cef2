use crate::error::ValidationError;
use crate::media::MediaFile;
use crate::service::ProcessRequest;

/// Current values of the user-supplied fields.
///
/// Holds state only; no network access.
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    video: Option<MediaFile>,
    references: Vec<MediaFile>,
    prompt: String,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the source video. The media kind is not re-checked here.
    pub fn set_video(&mut self, file: MediaFile) {
        self.video = Some(file);
    }

    pub fn clear_video(&mut self) {
        self.video = None;
    }

    /// Replace the whole reference set, keeping the given order.
    pub fn set_references(&mut self, files: impl IntoIterator<Item = MediaFile>) {
        self.references = files.into_iter().collect();
    }

    /// Stored verbatim, no trimming.
    pub fn set_prompt(&mut self, text: impl Into<String>) {
        self.prompt = text.into();
    }

    pub fn video(&self) -> Option<&MediaFile> {
        self.video.as_ref()
    }

    pub fn references(&self) -> &[MediaFile] {
        &self.references
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Missing video is reported before a missing prompt. References never
    /// fail validation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.video.is_none() {
            return Err(ValidationError::MissingVideo);
        }
        if self.prompt.is_empty() {
            return Err(ValidationError::MissingPrompt);
        }
        Ok(())
    }

    /// Snapshot of the fields as an outbound request.
    pub fn build_request(&self) -> Result<ProcessRequest, ValidationError> {
        self.validate()?;
        let video = self.video.clone().ok_or(ValidationError::MissingVideo)?;

        Ok(ProcessRequest {
            video,
            prompt: self.prompt.clone(),
            references: self.references.clone(),
        })
    }
}
