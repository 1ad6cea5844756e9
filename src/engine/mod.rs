//! Generation orchestration
//!
//! Builds the outfit transfer request, walks the ordered model fallback chain
//! until the provider accepts a call, aggregates the streamed response and
//! judges the result. Every entry point (HTTP, CLI) goes through [`Engine`].

pub mod aggregate;
pub mod candidates;
pub mod classify;
pub mod observer;
pub mod prompt;
pub mod validate;

pub use aggregate::{aggregate, AggregatedResult};
pub use candidates::{candidates_from_config, default_candidates, ModelCandidate};
pub use classify::{classify, classify_description, ClassifiedError, ErrorCategory};
pub use observer::{EngineEvent, EngineObserver, TracingObserver};
pub use prompt::build_request;
pub use validate::{validate, FailureReason, Outcome};

use crate::ai::gemini::{GeminiHttpClient, GeminiTransport};
use crate::ai::ProviderTransport;
use crate::models::{Config, GenerationRequest};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Stateless orchestrator; safe to share across concurrent requests.
#[derive(Clone)]
pub struct Engine {
    transport: Arc<dyn ProviderTransport>,
    candidates: Arc<[ModelCandidate]>,
    observer: Arc<dyn EngineObserver>,
}

impl Engine {
    pub fn new(transport: Arc<dyn ProviderTransport>, candidates: Vec<ModelCandidate>) -> Self {
        Self {
            transport,
            candidates: candidates.into(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Engine talking to Gemini with the configured candidate chain.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = GeminiHttpClient::new(config.connect_timeout)?
            .with_base_url(config.gemini_base_url.as_str());
        Ok(Self::new(
            Arc::new(GeminiTransport::new(http)),
            candidates_from_config(config),
        ))
    }

    pub fn with_observer(mut self, observer: Arc<dyn EngineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    /// Try each candidate in order until one transport call is accepted, then
    /// aggregate that candidate's stream.
    ///
    /// Refused calls fall through to the next candidate and only the last
    /// refusal is returned. Once a call is accepted no other candidate is
    /// tried, even if its stream later fails or yields no images.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<AggregatedResult> {
        let total = self.candidates.len();
        let mut last_error = None;

        for (index, candidate) in self.candidates.iter().enumerate() {
            let model = candidate.model();
            let provider_request = candidate.adjust(request);

            self.observer.on_event(&EngineEvent::AttemptStarted {
                model,
                attempt: index + 1,
                total,
            });

            match self
                .transport
                .stream_generate(request.credential(), &provider_request)
                .await
            {
                Ok(stream) => {
                    self.observer
                        .on_event(&EngineEvent::AttemptAccepted { model });
                    return aggregate(stream, self.observer.as_ref())
                        .await
                        .inspect_err(|error| {
                            self.observer
                                .on_event(&EngineEvent::StreamFailed { model, error })
                        });
                }
                Err(error) => {
                    self.observer.on_event(&EngineEvent::AttemptFailed {
                        model,
                        error: &error,
                        remaining: total - index - 1,
                    });
                    last_error = Some(error);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| Error::Config("no model candidates configured".to_string())))
    }

    /// Run [`Engine::generate`] and judge the result.
    pub async fn transfer(&self, request: &GenerationRequest) -> Result<Outcome> {
        let started = Instant::now();
        let result = self.generate(request).await?;
        let outcome = validate(result, started.elapsed());
        if let Outcome::Failure { text, .. } = &outcome {
            self.observer
                .on_event(&EngineEvent::NoImagesProduced { text });
        }
        Ok(outcome)
    }

    /// Like [`Engine::transfer`], but abandons the in-flight attempt as soon as
    /// `token` is cancelled. No further candidates are tried after that.
    pub async fn transfer_with_cancellation(
        &self,
        request: &GenerationRequest,
        token: &CancellationToken,
    ) -> Result<Outcome> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                self.observer.on_event(&EngineEvent::Cancelled);
                Err(Error::Cancelled)
            }
            outcome = self.transfer(request) => outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::{MockTransport, TINY_PNG_BASE64};
    use crate::ai::types::StreamFragment;
    use crate::ai::MockOutcome;
    use crate::models::ImagePayload;
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EngineObserver for RecordingObserver {
        fn on_event(&self, event: &EngineEvent<'_>) {
            let label = match event {
                EngineEvent::AttemptStarted { model, .. } => format!("start:{}", model),
                EngineEvent::AttemptFailed { model, .. } => format!("fail:{}", model),
                EngineEvent::AttemptAccepted { model } => format!("accept:{}", model),
                EngineEvent::ImageExtracted { count } => format!("image:{}", count),
                EngineEvent::StreamFailed { model, .. } => format!("stream-fail:{}", model),
                EngineEvent::StreamCompleted { images, .. } => format!("done:{}", images),
                EngineEvent::NoImagesProduced { text } => format!("no-images:{}", text),
                EngineEvent::Cancelled => "cancelled".to_string(),
            };
            self.events.lock().unwrap().push(label);
        }
    }

    fn request() -> GenerationRequest {
        build_request(
            ImagePayload::new("image/png", TINY_PNG_BASE64),
            ImagePayload::new("image/png", TINY_PNG_BASE64),
            "user-key",
        )
        .unwrap()
    }

    fn chain() -> Vec<ModelCandidate> {
        vec![
            ModelCandidate::multimodal("first"),
            ModelCandidate::multimodal("second"),
            ModelCandidate::text_guidance("last"),
        ]
    }

    fn engine(transport: &MockTransport) -> Engine {
        Engine::new(Arc::new(transport.clone()), chain())
    }

    #[tokio::test]
    async fn test_first_candidate_success_stops_iteration() {
        let transport = MockTransport::new()
            .with_fragments(vec![StreamFragment::image("image/png", "X")]);

        let result = engine(&transport).generate(&request()).await.unwrap();

        assert_eq!(result.images.len(), 1);
        assert_eq!(transport.called_models(), vec!["first"]);
        assert_eq!(transport.calls()[0].credential, "user-key");
    }

    #[tokio::test]
    async fn test_falls_back_in_order_until_accepted() {
        let transport = MockTransport::new()
            .with_rejection("models/first is not found")
            .with_rejection("models/second is not found")
            .with_fragments(vec![StreamFragment::image("image/png", "X")]);
        let observer = Arc::new(RecordingObserver::default());

        let result = engine(&transport)
            .with_observer(observer.clone())
            .generate(&request())
            .await
            .unwrap();

        assert_eq!(result.images, vec![crate::ai::GeneratedImage::new("image/png", "X")]);
        assert_eq!(transport.called_models(), vec!["first", "second", "last"]);
        assert_eq!(
            observer.events(),
            vec![
                "start:first",
                "fail:first",
                "start:second",
                "fail:second",
                "start:last",
                "accept:last",
                "image:1",
                "done:1"
            ]
        );
    }

    #[tokio::test]
    async fn test_last_failure_is_propagated() {
        let transport = MockTransport::new()
            .with_rejection("quota exceeded")
            .with_rejection("permission denied")
            .with_rejection("models/last is not found");

        let err = engine(&transport).generate(&request()).await.unwrap_err();

        assert_eq!(err.to_string(), "models/last is not found");
        assert_eq!(transport.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_accepted_candidate_without_images_does_not_fall_back() {
        let transport =
            MockTransport::new().with_fragments(vec![StreamFragment::text("I can't do that")]);
        let observer = Arc::new(RecordingObserver::default());

        let outcome = engine(&transport)
            .with_observer(observer.clone())
            .transfer(&request())
            .await
            .unwrap();

        assert!(!outcome.is_success());
        assert_eq!(outcome.text(), "I can't do that");
        assert_eq!(transport.get_call_count(), 1);
        assert_eq!(
            observer.events().last().unwrap(),
            "no-images:I can't do that"
        );
    }

    #[tokio::test]
    async fn test_stream_failure_propagates_without_fallback() {
        let transport = MockTransport::new().with_outcome(MockOutcome::Stream(vec![
            Ok(StreamFragment::image("image/png", "X")),
            Err("network connection lost".to_string()),
        ]));
        let observer = Arc::new(RecordingObserver::default());

        let err = engine(&transport)
            .with_observer(observer.clone())
            .generate(&request())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "network connection lost");
        assert_eq!(transport.get_call_count(), 1);
        assert_eq!(observer.events().last().unwrap(), "stream-fail:first");
    }

    #[tokio::test]
    async fn test_text_guidance_candidate_receives_no_images() {
        let transport = MockTransport::new()
            .with_rejection("model a down")
            .with_rejection("model b down")
            .with_fragments(vec![StreamFragment::text("Step 1")]);

        assert_ok!(engine(&transport).transfer(&request()).await);

        let calls = transport.calls();
        assert_eq!(calls[0].request.inline_part_count(), 2);
        assert_eq!(calls[1].request.inline_part_count(), 2);
        assert_eq!(calls[2].request.inline_part_count(), 0);
    }

    #[test]
    fn test_from_config_uses_configured_chain() {
        let config = Config {
            image_models: vec!["img-a".to_string()],
            text_fallback_model: "txt".to_string(),
            ..Config::default()
        };

        let engine = Engine::from_config(&config).unwrap();
        let models: Vec<&str> = engine.candidates().iter().map(|c| c.model()).collect();

        assert_eq!(models, vec!["img-a", "txt"]);
        assert!(!engine.candidates()[1].supports_multimodal_input());
    }

    #[tokio::test]
    async fn test_empty_chain_is_an_error() {
        let transport = MockTransport::new();
        let engine = Engine::new(Arc::new(transport.clone()), vec![]);

        assert_err!(engine.generate(&request()).await);
        assert_eq!(transport.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_abandons_pending_attempt() {
        let transport = MockTransport::new().with_pending();
        let engine = engine(&transport);
        let token = CancellationToken::new();

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                token.cancel();
            })
        };

        let err = engine
            .transfer_with_cancellation(&request(), &token)
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(transport.called_models(), vec!["first"]);
    }

    #[tokio::test]
    async fn test_already_cancelled_token_makes_no_calls() {
        let transport = MockTransport::new();
        let token = CancellationToken::new();
        token.cancel();

        let err = engine(&transport)
            .transfer_with_cancellation(&request(), &token)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(transport.get_call_count(), 0);
    }
}
