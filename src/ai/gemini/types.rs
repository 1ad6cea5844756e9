//! Gemini `streamGenerateContent` wire types.

use crate::ai::types::{self as core, FragmentPart, GeneratedImage, Modality, StreamFragment};
use serde::{Deserialize, Serialize};

/// Gemini content container used in both requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Untagged union of text and inline media content parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    /// Part kinds this service does not consume (thought signatures, function calls).
    Other(serde_json::Value),
}

/// Base64 inline payload used for image requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct StreamRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_modalities: Vec<String>,
}

impl From<&core::ProviderRequest> for StreamRequest {
    fn from(request: &core::ProviderRequest) -> Self {
        let contents = request
            .contents
            .iter()
            .map(|content| Content {
                role: Some(content.role.clone()),
                parts: content
                    .parts
                    .iter()
                    .map(|part| match part {
                        core::Part::Text(text) => Part::Text { text: text.clone() },
                        core::Part::InlineData { mime_type, data } => Part::InlineData {
                            inline_data: InlineData {
                                mime_type: mime_type.clone(),
                                data: data.clone(),
                            },
                        },
                    })
                    .collect(),
            })
            .collect();

        let response_modalities = request
            .config
            .response_modalities
            .iter()
            .map(|m| match m {
                Modality::Image => "IMAGE".to_string(),
                Modality::Text => "TEXT".to_string(),
            })
            .collect();

        Self {
            contents,
            generation_config: GenerationConfig {
                temperature: request.config.temperature,
                max_output_tokens: request.config.max_output_tokens,
                response_modalities,
            },
        }
    }
}

/// One streamed `generateContent` chunk.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Convert the first candidate's parts into a fragment.
    pub fn into_fragment(self) -> StreamFragment {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!("Gemini blocked the prompt: {}", reason);
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return StreamFragment::empty();
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            tracing::debug!("Gemini candidate finished: {}", reason);
        }

        let parts = match candidate.content {
            Some(content) if !content.parts.is_empty() => content.parts,
            _ => return StreamFragment::empty(),
        };

        let parts = parts
            .into_iter()
            .filter_map(|part| match part {
                Part::InlineData { inline_data } if !inline_data.data.is_empty() => {
                    Some(FragmentPart::Image(GeneratedImage::new(
                        inline_data.mime_type,
                        inline_data.data,
                    )))
                }
                Part::Text { text } if !text.is_empty() => Some(FragmentPart::Text(text)),
                _ => None,
            })
            .collect();

        StreamFragment::new(parts)
    }
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::{GenerationConfig as CoreConfig, ProviderRequest};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_stream_request_serialization() {
        let request = ProviderRequest {
            model: "gemini-2.5-flash-image-preview".to_string(),
            config: CoreConfig {
                temperature: 0.5,
                max_output_tokens: 8192,
                response_modalities: vec![Modality::Image, Modality::Text],
            },
            contents: vec![core::Content {
                role: "user".to_string(),
                parts: vec![
                    core::Part::Text("prompt".to_string()),
                    core::Part::InlineData {
                        mime_type: "image/jpeg".to_string(),
                        data: "AAAA".to_string(),
                    },
                ],
            }],
        };

        let value = serde_json::to_value(StreamRequest::from(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "prompt" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "AAAA" } }
                    ]
                }],
                "generationConfig": {
                    "temperature": 0.5,
                    "maxOutputTokens": 8192,
                    "responseModalities": ["IMAGE", "TEXT"]
                }
            })
        );
    }

    #[test]
    fn test_empty_modalities_are_omitted() {
        let request = ProviderRequest {
            model: "m".to_string(),
            config: CoreConfig {
                temperature: 0.5,
                max_output_tokens: 1000,
                response_modalities: vec![],
            },
            contents: vec![],
        };

        let value = serde_json::to_value(StreamRequest::from(&request)).unwrap();
        assert!(value["generationConfig"].get("responseModalities").is_none());
    }

    #[test]
    fn test_chunk_with_mixed_parts_keeps_order() {
        let chunk: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "a" },
                        { "inlineData": { "mimeType": "image/png", "data": "X" } },
                        { "thoughtSignature": "sig" },
                        { "text": "b" }
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(
            chunk.into_fragment(),
            StreamFragment::new(vec![
                FragmentPart::Text("a".to_string()),
                FragmentPart::Image(GeneratedImage::new("image/png", "X")),
                FragmentPart::Text("b".to_string()),
            ])
        );
    }

    #[test]
    fn test_chunk_without_candidates_is_empty() {
        let chunk: GenerateContentResponse =
            serde_json::from_value(json!({ "usageMetadata": { "totalTokenCount": 3 } })).unwrap();
        assert_eq!(chunk.into_fragment(), StreamFragment::empty());
    }

    #[test]
    fn test_chunk_without_content_is_empty() {
        let chunk: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "STOP" }]
        }))
        .unwrap();
        assert_eq!(chunk.into_fragment(), StreamFragment::empty());
    }

    #[test]
    fn test_inline_data_without_payload_is_skipped() {
        let chunk: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "" } }] }
            }]
        }))
        .unwrap();
        assert_eq!(chunk.into_fragment(), StreamFragment::new(vec![]));
    }
}
