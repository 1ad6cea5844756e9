use super::aggregate::AggregatedResult;
use crate::ai::types::GeneratedImage;
use crate::{Error, Result};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    NoImagesProduced,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoImagesProduced => "no-images-produced",
        }
    }
}

/// Final verdict on a completed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        images: Vec<GeneratedImage>,
        text: String,
        elapsed: Duration,
    },
    Failure {
        reason: FailureReason,
        text: String,
        elapsed: Duration,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Success { text, .. } | Self::Failure { text, .. } => text,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Success { elapsed, .. } | Self::Failure { elapsed, .. } => *elapsed,
        }
    }

    /// Images and accompanying text, or [`Error::NoImagesProduced`].
    pub fn into_images(self) -> Result<(Vec<GeneratedImage>, String)> {
        match self {
            Self::Success { images, text, .. } => Ok((images, text)),
            Self::Failure { text, .. } => Err(Error::NoImagesProduced { text }),
        }
    }
}

/// A generation succeeds only if it produced at least one image; providers
/// may answer with nothing but text when they decline the transformation.
pub fn validate(result: AggregatedResult, elapsed: Duration) -> Outcome {
    if result.images.is_empty() {
        Outcome::Failure {
            reason: FailureReason::NoImagesProduced,
            text: result.text,
            elapsed,
        }
    } else {
        Outcome::Success {
            images: result.images,
            text: result.text,
            elapsed,
        }
    }
}
