use super::types::ApiErrorResponse;
use crate::models::DEFAULT_GEMINI_BASE_URL;
use crate::{Error, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Lightweight Gemini REST client. The API key travels with each call since
/// every request carries the end user's own credential.
#[derive(Clone)]
pub struct GeminiHttpClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl GeminiHttpClient {
    /// Construct a client. Only connection establishment is bounded by
    /// `connect_timeout`; generation streams may run as long as the provider needs.
    pub fn new(connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self::new_with_client(client))
    }

    pub fn new_with_client(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Calls Gemini's `streamGenerateContent` endpoint in SSE mode.
    ///
    /// `model` should be the bare model ID, not a `models/...`-prefixed path.
    pub async fn stream_generate_content<Req: Serialize>(
        &self,
        api_key: &str,
        model: &str,
        request: &Req,
    ) -> Result<reqwest::Response> {
        let model = model.strip_prefix("models/").unwrap_or(model);
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                describe_send_error(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.map_err(describe_send_error)?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            let message = serde_json::from_str::<ApiErrorResponse>(&error_text)
                .map(|body| body.error.message)
                .unwrap_or(error_text);
            return Err(Error::Provider(format!(
                "Gemini API error (status {}): {}",
                status.as_u16(),
                message
            )));
        }

        Ok(response)
    }
}

/// Strip the request URL (it names the model and endpoint, which would skew
/// classification) and tag connection and timeout faults.
pub(crate) fn describe_send_error(e: reqwest::Error) -> Error {
    let e = e.without_url();
    if e.is_timeout() {
        Error::Provider(format!("Gemini request timeout: {}", e))
    } else if e.is_connect() {
        Error::Provider(format!("Gemini network error: {}", e))
    } else {
        Error::Http(e)
    }
}
