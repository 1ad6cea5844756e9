//! Request and response shapes of the outfit transfer operation.
//!
//! Entry points hand a [`TransferRequest`] to [`handle_transfer`] and render the
//! returned [`TransferReply`] in whatever way their transport requires.

use crate::engine::{build_request, classify, Engine, Outcome};
use crate::models::ImagePayload;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info, warn};

pub const NO_IMAGES_MESSAGE: &str = "No se generaron imágenes";
pub const NO_IMAGES_DETAILS: &str =
    "El modelo no devolvió imágenes. Posible problema con el prompt o las imágenes de entrada.";
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON in request body";
pub const NOT_FOUND_MESSAGE: &str = "Endpoint no encontrado";

/// Inbound body. Accepts both the documented field names and the ones the
/// browser client sends (`apiKey`, `userImage`, `outfitImage`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[serde(default, alias = "apiKey")]
    pub credential: Option<String>,
    #[serde(default, alias = "userImage")]
    pub subject_image: Option<ImagePayload>,
    #[serde(default, alias = "outfitImage")]
    pub reference_image: Option<ImagePayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessBody {
    pub success: bool,
    pub images: Vec<String>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub processing_time: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl FailureBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
            category: None,
            text: None,
            processing_time: None,
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransferBody {
    Success(SuccessBody),
    Failure(FailureBody),
}

/// A response body paired with its HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReply {
    pub status: u16,
    pub body: TransferBody,
}

impl TransferReply {
    fn failure(status: u16, body: FailureBody) -> Self {
        Self {
            status,
            body: TransferBody::Failure(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthBody {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

pub fn health() -> HealthBody {
    HealthBody {
        success: true,
        message: "Outfit transfer server is running".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    }
}

pub fn invalid_json(details: impl Into<String>) -> TransferReply {
    let mut body = FailureBody::new(INVALID_JSON_MESSAGE);
    body.details = Some(details.into());
    TransferReply::failure(400, body)
}

pub fn not_found() -> TransferReply {
    TransferReply::failure(404, FailureBody::new(NOT_FOUND_MESSAGE))
}

/// Validate the input, run the engine and shape the reply.
pub async fn handle_transfer(engine: &Engine, input: TransferRequest) -> TransferReply {
    let started = Instant::now();

    info!(
        "Outfit transfer request: has_credential={}, subject_image_size={}, reference_image_size={}",
        input.credential.as_deref().is_some_and(|c| !c.is_empty()),
        input.subject_image.as_ref().map_or(0, |i| i.data.len()),
        input.reference_image.as_ref().map_or(0, |i| i.data.len()),
    );

    let request = match build_request(
        input.subject_image.unwrap_or_default(),
        input.reference_image.unwrap_or_default(),
        input.credential.as_deref().unwrap_or_default(),
    ) {
        Ok(request) => request,
        Err(invalid) => {
            warn!("Rejected request ({}): {}", invalid.field(), invalid);
            return TransferReply::failure(400, FailureBody::new(invalid.to_string()));
        }
    };

    match engine.transfer(&request).await {
        Ok(Outcome::Success {
            images,
            text,
            elapsed,
        }) => {
            info!(
                "Outfit transfer completed: {} images in {}ms",
                images.len(),
                elapsed.as_millis()
            );
            TransferReply {
                status: 200,
                body: TransferBody::Success(SuccessBody {
                    success: true,
                    count: images.len(),
                    images: images.into_iter().map(|image| image.data).collect(),
                    text: (!text.is_empty()).then_some(text),
                    processing_time: elapsed.as_millis() as u64,
                }),
            }
        }
        Ok(Outcome::Failure {
            reason,
            text,
            elapsed,
        }) => {
            let mut body = FailureBody::new(NO_IMAGES_MESSAGE);
            body.details = Some(NO_IMAGES_DETAILS.to_string());
            body.category = Some(reason.as_str().to_string());
            body.text = Some(text);
            body.processing_time = Some(elapsed.as_millis() as u64);
            TransferReply::failure(500, body)
        }
        Err(failure) => {
            let classified = classify(&failure);
            let processing_time = started.elapsed().as_millis() as u64;
            error!(
                "Outfit transfer failed after {}ms ({:?}): {}",
                processing_time, classified.category, classified.raw_detail
            );

            let mut body = FailureBody::new(classified.user_message);
            body.details = Some(classified.raw_detail);
            body.category = serde_json::to_value(classified.category)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string));
            body.processing_time = Some(processing_time);
            body.timestamp = Some(Utc::now().to_rfc3339());
            TransferReply::failure(classified.http_status, body)
        }
    }
}
