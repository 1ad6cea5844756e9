//! Provider transport integration for outfit generation
//!
//! Defines the seam between the generation engine and a multimodal provider,
//! plus the Gemini implementation and a scripted mock for tests.

pub mod gemini;
pub mod mime;
pub mod mock;
pub mod types;

pub use gemini::GeminiTransport;
pub use mock::{MockOutcome, MockTransport};
pub use types::{
    Content, FragmentPart, FragmentStream, GeneratedImage, GenerationConfig, Modality, Part,
    ProviderRequest, StreamFragment,
};

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// Start a streaming generation for `request` on behalf of `credential`.
    ///
    /// An `Err` means the provider refused the call outright. Failures that
    /// happen after acceptance are delivered as stream items.
    async fn stream_generate(
        &self,
        credential: &str,
        request: &ProviderRequest,
    ) -> Result<FragmentStream>;
}
