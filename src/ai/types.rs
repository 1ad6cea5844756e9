//! Provider-agnostic request descriptor and streamed response fragments.

use crate::Result;
use futures::Stream;
use std::pin::Pin;

/// Output kind the provider is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Image,
    Text,
}

/// One ordered segment of a request content block.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    InlineData { mime_type: String, data: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub response_modalities: Vec<Modality>,
}

/// A request shaped for a single candidate model.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub model: String,
    pub config: GenerationConfig,
    pub contents: Vec<Content>,
}

impl ProviderRequest {
    /// Number of inline binary parts across all content blocks.
    pub fn inline_part_count(&self) -> usize {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter(|p| matches!(p, Part::InlineData { .. }))
            .count()
    }
}

/// Image returned by the provider, kept as base64 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: String,
}

impl GeneratedImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        use base64::Engine as _;
        Ok(base64::engine::general_purpose::STANDARD.decode(&self.data)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentPart {
    Image(GeneratedImage),
    Text(String),
}

/// One incremental unit of a streaming response.
///
/// `parts` is `None` for keep-alive or metadata-only chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamFragment {
    pub parts: Option<Vec<FragmentPart>>,
}

impl StreamFragment {
    pub fn new(parts: Vec<FragmentPart>) -> Self {
        Self { parts: Some(parts) }
    }

    pub fn empty() -> Self {
        Self { parts: None }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![FragmentPart::Text(text.into())])
    }

    pub fn image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::new(vec![FragmentPart::Image(GeneratedImage::new(mime_type, data))])
    }
}

/// Lazy, single-pass sequence of fragments for one accepted attempt.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<StreamFragment>> + Send>>;
