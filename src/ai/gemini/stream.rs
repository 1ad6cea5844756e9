use super::types::GenerateContentResponse;
use crate::ai::types::{FragmentStream, StreamFragment};
use crate::{Error, Result};
use eventsource_stream::{EventStreamError, Eventsource};
use futures::{Stream, StreamExt};

/// Turn an accepted SSE response into a fragment stream.
pub fn fragment_stream(response: reqwest::Response) -> FragmentStream {
    Box::pin(parse_sse(response.bytes_stream()))
}

/// Parse SSE-framed `generateContent` chunks from a byte stream.
pub fn parse_sse<S, B>(bytes: S) -> impl Stream<Item = Result<StreamFragment>> + Send
where
    S: Stream<Item = std::result::Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    bytes.eventsource().filter_map(|event| async move {
        match event {
            Ok(event) => {
                let data = event.data.trim();
                if data.is_empty() || data == "[DONE]" {
                    return None;
                }
                Some(
                    serde_json::from_str::<GenerateContentResponse>(data)
                        .map(GenerateContentResponse::into_fragment)
                        .map_err(|e| {
                            tracing::error!("Failed to parse Gemini stream chunk: {}", e);
                            Error::Serialization(e)
                        }),
                )
            }
            Err(EventStreamError::Transport(e)) => Some(Err(Error::Provider(format!(
                "Gemini stream network error: {}",
                e.without_url()
            )))),
            Err(e) => Some(Err(Error::Provider(format!(
                "Gemini stream could not be decoded: {}",
                e
            )))),
        }
    })
}
