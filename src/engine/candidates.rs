use crate::ai::types::{Content, GenerationConfig, Modality, Part, ProviderRequest};
use crate::models::{
    Config, GenerationRequest, Modalities, DEFAULT_IMAGE_MODELS, DEFAULT_TEXT_FALLBACK_MODEL,
};
use crate::prompts;

/// Output token cap for the text guidance fallback.
pub const TEXT_GUIDANCE_MAX_OUTPUT_TOKENS: u32 = 1000;

/// How a candidate's request is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestShape {
    /// Instruction plus both images; image and text output.
    Multimodal,
    /// Text-only request asking for written guidance instead of an image.
    TextGuidance,
}

/// One entry of the ordered fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    model: String,
    shape: RequestShape,
}

impl ModelCandidate {
    pub fn multimodal(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            shape: RequestShape::Multimodal,
        }
    }

    pub fn text_guidance(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            shape: RequestShape::TextGuidance,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn supports_multimodal_input(&self) -> bool {
        self.shape == RequestShape::Multimodal
    }

    /// Shape `request` for this candidate.
    pub fn adjust(&self, request: &GenerationRequest) -> ProviderRequest {
        match self.shape {
            RequestShape::Multimodal => ProviderRequest {
                model: self.model.clone(),
                config: GenerationConfig {
                    temperature: request.temperature(),
                    max_output_tokens: request.max_output_tokens(),
                    response_modalities: response_modalities(request.modalities()),
                },
                contents: vec![Content {
                    role: "user".to_string(),
                    parts: vec![
                        Part::Text(request.prompt_text().to_string()),
                        inline(request.subject_image()),
                        inline(request.reference_image()),
                    ],
                }],
            },
            RequestShape::TextGuidance => ProviderRequest {
                model: self.model.clone(),
                config: GenerationConfig {
                    temperature: request.temperature(),
                    max_output_tokens: TEXT_GUIDANCE_MAX_OUTPUT_TOKENS,
                    response_modalities: response_modalities(Modalities::TEXT_ONLY),
                },
                contents: vec![Content {
                    role: "user".to_string(),
                    parts: vec![Part::Text(prompts::TEXT_FALLBACK.trim_end().to_string())],
                }],
            },
        }
    }
}

fn response_modalities(modalities: Modalities) -> Vec<Modality> {
    let mut wanted = Vec::with_capacity(2);
    if modalities.want_images {
        wanted.push(Modality::Image);
    }
    if modalities.want_text {
        wanted.push(Modality::Text);
    }
    wanted
}

fn inline(image: &crate::models::ImagePayload) -> Part {
    Part::InlineData {
        mime_type: image.mime_type.clone(),
        data: image.data.clone(),
    }
}

/// Best image models first, text guidance last.
pub fn default_candidates() -> Vec<ModelCandidate> {
    build_chain(DEFAULT_IMAGE_MODELS.iter().copied(), DEFAULT_TEXT_FALLBACK_MODEL)
}

pub fn candidates_from_config(config: &Config) -> Vec<ModelCandidate> {
    build_chain(
        config.image_models.iter().map(String::as_str),
        &config.text_fallback_model,
    )
}

fn build_chain<'a>(
    image_models: impl Iterator<Item = &'a str>,
    text_model: &str,
) -> Vec<ModelCandidate> {
    image_models
        .map(ModelCandidate::multimodal)
        .chain(std::iter::once(ModelCandidate::text_guidance(text_model)))
        .collect()
}
