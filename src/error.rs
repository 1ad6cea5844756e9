//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

/// Local input problems detected before any provider call is made.
///
/// Display strings are the user-facing (Spanish) messages returned to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("API Key es requerida")]
    MissingCredential,

    #[error("Imagen de usuario es requerida")]
    MissingSubjectImage,

    #[error("Imagen de outfit es requerida")]
    MissingReferenceImage,

    #[error("Imagen de usuario inválida")]
    InvalidSubjectImage,

    #[error("Imagen de outfit inválida")]
    InvalidReferenceImage,

    #[error("Imagen de usuario no encontrada: {0}")]
    SubjectImageNotFound(String),

    #[error("Imagen de outfit no encontrada: {0}")]
    ReferenceImageNotFound(String),
}

impl ValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingCredential => "credential",
            Self::MissingSubjectImage
            | Self::InvalidSubjectImage
            | Self::SubjectImageNotFound(_) => "subjectImage",
            Self::MissingReferenceImage
            | Self::InvalidReferenceImage
            | Self::ReferenceImageNotFound(_) => "referenceImage",
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Failure reported by the generation provider. The payload is the provider's own
    /// description and is what the error classifier matches against.
    #[error("{0}")]
    Provider(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The provider accepted the call but answered without any image.
    #[error("No se generaron imágenes")]
    NoImagesProduced { text: String },

    #[error("Request cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_localized() {
        assert_eq!(
            ValidationError::MissingCredential.to_string(),
            "API Key es requerida"
        );
        assert_eq!(
            ValidationError::MissingSubjectImage.to_string(),
            "Imagen de usuario es requerida"
        );
        assert_eq!(
            ValidationError::MissingReferenceImage.to_string(),
            "Imagen de outfit es requerida"
        );
    }

    #[test]
    fn test_validation_field_names() {
        assert_eq!(ValidationError::MissingCredential.field(), "credential");
        assert_eq!(ValidationError::InvalidSubjectImage.field(), "subjectImage");
        assert_eq!(
            ValidationError::MissingReferenceImage.field(),
            "referenceImage"
        );
    }

    #[test]
    fn test_not_found_messages_keep_the_path() {
        let err = ValidationError::ReferenceImageNotFound("looks/red.png".to_string());
        assert_eq!(err.to_string(), "Imagen de outfit no encontrada: looks/red.png");
        assert_eq!(err.field(), "referenceImage");
    }

    #[test]
    fn test_provider_error_displays_raw_description() {
        let err = Error::Provider("quota exhausted for model x".to_string());
        assert_eq!(err.to_string(), "quota exhausted for model x");
    }
}
