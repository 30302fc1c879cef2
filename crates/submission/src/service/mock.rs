use super::{ProcessOutput, ProcessRequest, ProcessingService};
use crate::error::SubmissionError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Succeed {
        video_path: String,
        script: Option<String>,
    },
    Fail(SubmissionError),
}

impl Default for MockBehavior {
    fn default() -> Self {
        MockBehavior::Succeed {
            video_path: "/static/uploads/mock.mp4".to_string(),
            script: None,
        }
    }
}

/// Offline stand-in for the processing service. Records every request it
/// receives.
pub struct MockProcessingService {
    base_url: String,
    behavior: Mutex<MockBehavior>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ProcessRequest>>,
}

impl MockProcessingService {
    pub fn new(base_url: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            base_url: base_url.into(),
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(base_url: impl Into<String>, video_path: impl Into<String>) -> Self {
        Self::new(
            base_url,
            MockBehavior::Succeed {
                video_path: video_path.into(),
                script: None,
            },
        )
    }

    pub fn failing(base_url: impl Into<String>, error: SubmissionError) -> Self {
        Self::new(base_url, MockBehavior::Fail(error))
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ProcessRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl ProcessingService for MockProcessingService {
    fn name(&self) -> &str {
        "Mock"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn process(&self, request: &ProcessRequest) -> Result<ProcessOutput, SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let behavior = self.behavior.lock().clone();
        match behavior {
            MockBehavior::Succeed { video_path, script } => Ok(ProcessOutput {
                video_path,
                script,
            }),
            MockBehavior::Fail(err) => Err(err),
        }
    }
}
