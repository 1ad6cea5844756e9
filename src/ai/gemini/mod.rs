pub mod client;
pub mod stream;
pub mod types;

pub use client::GeminiHttpClient;

use super::types::{FragmentStream, ProviderRequest};
use super::ProviderTransport;
use crate::Result;
use async_trait::async_trait;
use types::StreamRequest;

/// [`ProviderTransport`] backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiTransport {
    http: GeminiHttpClient,
}

impl GeminiTransport {
    pub fn new(http: GeminiHttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ProviderTransport for GeminiTransport {
    async fn stream_generate(
        &self,
        credential: &str,
        request: &ProviderRequest,
    ) -> Result<FragmentStream> {
        tracing::debug!(
            "Sending streamGenerateContent request to Gemini (model: {}, inline parts: {})",
            request.model,
            request.inline_part_count()
        );

        let body = StreamRequest::from(request);
        let response = self
            .http
            .stream_generate_content(credential, &request.model, &body)
            .await?;

        Ok(stream::fragment_stream(response))
    }
}
