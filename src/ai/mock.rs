use super::types::{FragmentStream, ProviderRequest, StreamFragment};
use super::ProviderTransport;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Base64 of a 1x1 PNG, returned when no outcome is scripted.
pub const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8/5+hHgAHggJ/PchI7wAAAABJRU5ErkJggg==";

/// What the mock does for one transport call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// The transport call itself fails with this description.
    Reject(String),
    /// The call is accepted and yields these items; `Err` items fail the stream.
    Stream(Vec<std::result::Result<StreamFragment, String>>),
    /// The call never resolves.
    Pending,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub credential: String,
    pub request: ProviderRequest,
}

/// Scripted transport. Outcomes are consumed one per call, in order.
#[derive(Clone)]
pub struct MockTransport {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_outcome(self, outcome: MockOutcome) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_rejection(self, message: &str) -> Self {
        self.with_outcome(MockOutcome::Reject(message.to_string()))
    }

    pub fn with_fragments(self, fragments: Vec<StreamFragment>) -> Self {
        self.with_outcome(MockOutcome::Stream(
            fragments.into_iter().map(Ok).collect(),
        ))
    }

    pub fn with_pending(self) -> Self {
        self.with_outcome(MockOutcome::Pending)
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Model identifiers in the order they were called.
    pub fn called_models(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.request.model.clone())
            .collect()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderTransport for MockTransport {
    async fn stream_generate(
        &self,
        credential: &str,
        request: &ProviderRequest,
    ) -> Result<FragmentStream> {
        self.calls.lock().unwrap().push(RecordedCall {
            credential: credential.to_string(),
            request: request.clone(),
        });

        let outcome = self.outcomes.lock().unwrap().pop_front();
        match outcome {
            Some(MockOutcome::Reject(message)) => Err(Error::Provider(message)),
            Some(MockOutcome::Pending) => futures::future::pending().await,
            Some(MockOutcome::Stream(items)) => {
                let items: Vec<Result<StreamFragment>> = items
                    .into_iter()
                    .map(|item| item.map_err(Error::Provider))
                    .collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
            None => Ok(Box::pin(futures::stream::iter(vec![Ok(
                StreamFragment::image("image/png", TINY_PNG_BASE64),
            )]))),
        }
    }
}
