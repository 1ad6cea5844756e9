//! Engine events and the collaborator that records them.

use crate::Error;
use tracing::{debug, info, warn};

const TEXT_PREVIEW_CHARS: usize = 100;

#[derive(Debug)]
pub enum EngineEvent<'a> {
    AttemptStarted {
        model: &'a str,
        attempt: usize,
        total: usize,
    },
    AttemptFailed {
        model: &'a str,
        error: &'a Error,
        remaining: usize,
    },
    AttemptAccepted {
        model: &'a str,
    },
    ImageExtracted {
        count: usize,
    },
    StreamFailed {
        model: &'a str,
        error: &'a Error,
    },
    StreamCompleted {
        images: usize,
        text: &'a str,
    },
    NoImagesProduced {
        text: &'a str,
    },
    Cancelled,
}

pub trait EngineObserver: Send + Sync {
    fn on_event(&self, event: &EngineEvent<'_>);
}

/// Default observer: writes every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl EngineObserver for TracingObserver {
    fn on_event(&self, event: &EngineEvent<'_>) {
        match event {
            EngineEvent::AttemptStarted {
                model,
                attempt,
                total,
            } => info!("Attempting generation with {} ({}/{})", model, attempt, total),
            EngineEvent::AttemptFailed {
                model,
                error,
                remaining,
            } if *remaining > 0 => warn!(
                "Model {} failed: {}. Trying next model ({} left)",
                model, error, remaining
            ),
            EngineEvent::AttemptFailed { model, error, .. } => {
                warn!("Model {} failed: {}. No models left", model, error)
            }
            EngineEvent::AttemptAccepted { model } => {
                info!("{} accepted the request, processing stream", model)
            }
            EngineEvent::ImageExtracted { count } => debug!("Image {} extracted from stream", count),
            EngineEvent::StreamFailed { model, error } => {
                warn!("Stream from {} failed: {}", model, error)
            }
            EngineEvent::StreamCompleted { images, text } => {
                let preview: String = text.chars().take(TEXT_PREVIEW_CHARS).collect();
                info!(
                    "Stream processing completed: {} images, text: {:?}",
                    images, preview
                );
            }
            EngineEvent::NoImagesProduced { text } => {
                let preview: String = text.chars().take(TEXT_PREVIEW_CHARS).collect();
                warn!("No images were generated in the response, text: {:?}", preview)
            }
            EngineEvent::Cancelled => info!("Generation cancelled by caller"),
        }
    }
}
