use crate::error::GenerationError;
use crate::result::GenerationResult;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// One call to the external text generation capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Fixed instructions describing the expected output
    pub system: String,

    /// The task itself
    pub prompt: String,

    /// Ask the backend for JSON output rather than free text
    pub structured: bool,
}

impl GenerationRequest {
    pub fn structured(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            structured: true,
        }
    }

    pub fn text(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            structured: false,
        }
    }
}

/// The opaque `generate(prompt) -> text` capability
///
/// Responses are untrusted text; callers extract and validate any JSON
/// themselves.
pub trait GenerationBackend: Send + Sync {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = GenerationResult<String>> + Send;
}

impl<T: GenerationBackend> GenerationBackend for Arc<T> {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = GenerationResult<String>> + Send {
        (**self).generate(request)
    }
}

/// Backend used when no generation capability is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGenerator;

impl GenerationBackend for OfflineGenerator {
    fn generate(
        &self,
        _request: GenerationRequest,
    ) -> impl Future<Output = GenerationResult<String>> + Send {
        std::future::ready(Err(GenerationError::Unavailable(
            "no generation backend configured".to_string(),
        )))
    }
}

/// Replays queued responses in order and records every request
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<GenerationResult<String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let generator = Self::new();
        for response in responses {
            generator.push(response);
        }
        generator
    }

    pub fn push(&self, response: impl Into<String>) {
        self.lock_responses().push_back(Ok(response.into()));
    }

    pub fn push_error(&self, error: GenerationError) {
        self.lock_responses().push_back(Err(error));
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<GenerationResult<String>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GenerationBackend for ScriptedGenerator {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = GenerationResult<String>> + Send {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
        let response = self
            .lock_responses()
            .pop_front()
            .unwrap_or(Err(GenerationError::Exhausted));
        std::future::ready(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_generator_replays_in_order() {
        let generator = ScriptedGenerator::with_responses(["first", "second"]);

        let a = generator
            .generate(GenerationRequest::text("sys", "one"))
            .await
            .unwrap();
        let b = generator
            .generate(GenerationRequest::structured("sys", "two"))
            .await
            .unwrap();
        let c = generator.generate(GenerationRequest::text("sys", "three")).await;

        assert_eq!(a, "first");
        assert_eq!(b, "second");
        assert_eq!(c, Err(GenerationError::Exhausted));

        let prompts: Vec<_> = generator.requests().into_iter().map(|r| r.prompt).collect();
        assert_eq!(prompts, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_offline_generator_is_unavailable() {
        let result = OfflineGenerator
            .generate(GenerationRequest::text("sys", "hi"))
            .await;
        assert!(matches!(result, Err(GenerationError::Unavailable(_))));
    }
}
