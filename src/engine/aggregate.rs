use super::observer::{EngineEvent, EngineObserver};
use crate::ai::types::{FragmentPart, FragmentStream, GeneratedImage, StreamFragment};
use crate::Result;
use futures::TryStreamExt;

/// Images and text collected from one accepted attempt, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedResult {
    pub images: Vec<GeneratedImage>,
    pub text: String,
}

impl AggregatedResult {
    /// Fold one fragment in. Returns how many images it contributed.
    pub fn absorb(&mut self, fragment: StreamFragment) -> usize {
        let Some(parts) = fragment.parts else {
            return 0;
        };

        let before = self.images.len();
        for part in parts {
            match part {
                FragmentPart::Image(image) => self.images.push(image),
                FragmentPart::Text(text) => self.text.push_str(&text),
            }
        }
        self.images.len() - before
    }
}

/// Drain `stream` to completion.
///
/// A failing item aborts aggregation; whatever was collected is dropped and
/// the error is returned.
pub async fn aggregate(
    mut stream: FragmentStream,
    observer: &dyn EngineObserver,
) -> Result<AggregatedResult> {
    let mut result = AggregatedResult::default();

    while let Some(fragment) = stream.try_next().await? {
        let added = result.absorb(fragment);
        for n in (result.images.len() - added)..result.images.len() {
            observer.on_event(&EngineEvent::ImageExtracted { count: n + 1 });
        }
    }

    observer.on_event(&EngineEvent::StreamCompleted {
        images: result.images.len(),
        text: &result.text,
    });
    Ok(result)
}
