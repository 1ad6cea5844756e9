use crate::error::ValidationError;
use crate::models::{GenerationRequest, ImagePayload, Modalities};
use crate::prompts;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Validate caller input and assemble the outfit transfer request.
///
/// Checks run in order (credential, subject image, reference image) and the
/// first problem found is returned. No network access happens here.
pub fn build_request(
    subject_image: ImagePayload,
    reference_image: ImagePayload,
    credential: &str,
) -> Result<GenerationRequest, ValidationError> {
    if credential.trim().is_empty() {
        return Err(ValidationError::MissingCredential);
    }
    if subject_image.is_blank() {
        return Err(ValidationError::MissingSubjectImage);
    }
    if reference_image.is_blank() {
        return Err(ValidationError::MissingReferenceImage);
    }
    if !is_base64(&subject_image.data) {
        return Err(ValidationError::InvalidSubjectImage);
    }
    if !is_base64(&reference_image.data) {
        return Err(ValidationError::InvalidReferenceImage);
    }

    Ok(GenerationRequest {
        credential: credential.to_string(),
        subject_image,
        reference_image,
        prompt_text: prompts::OUTFIT_TRANSFER.trim_end().to_string(),
        modalities: Modalities::IMAGE_AND_TEXT,
        temperature: DEFAULT_TEMPERATURE,
        max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
    })
}

fn is_base64(data: &str) -> bool {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .is_ok()
}
