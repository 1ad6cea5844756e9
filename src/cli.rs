//! Command-line transfer
//!
//! Reads two image files, runs one outfit transfer and writes every returned
//! image next to the given output prefix.

use crate::ai::mime::{detect_image_mime, extension_for_mime};
use crate::engine::{build_request, Engine};
use crate::error::ValidationError;
use crate::models::ImagePayload;
use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const DEFAULT_OUTPUT_PREFIX: &str = "outfit_transfer";

#[derive(Debug, Clone)]
pub struct TransferJob {
    pub user_image: PathBuf,
    pub outfit_image: PathBuf,
    pub output_prefix: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct TransferReport {
    pub saved: Vec<PathBuf>,
    pub text: String,
    pub elapsed: Duration,
}

pub async fn run_transfer(
    engine: &Engine,
    job: &TransferJob,
    token: &CancellationToken,
) -> Result<TransferReport> {
    let subject = read_image(&job.user_image, ValidationError::SubjectImageNotFound).await?;
    let reference = read_image(&job.outfit_image, ValidationError::ReferenceImageNotFound).await?;
    let request = build_request(subject, reference, &job.api_key)?;

    info!(
        "Transferring outfit from {} onto {}",
        job.outfit_image.display(),
        job.user_image.display()
    );

    let outcome = engine.transfer_with_cancellation(&request, token).await?;
    let elapsed = outcome.elapsed();
    let (images, text) = outcome.into_images()?;

    let mut saved = Vec::with_capacity(images.len());
    for (index, image) in images.iter().enumerate() {
        let path = PathBuf::from(format!(
            "{}_{}.{}",
            job.output_prefix,
            index + 1,
            extension_for_mime(&image.mime_type)
        ));
        tokio::fs::write(&path, image.decode()?).await?;
        info!("Saved {}", path.display());
        saved.push(path);
    }

    Ok(TransferReport {
        saved,
        text,
        elapsed,
    })
}

async fn read_image(
    path: &Path,
    not_found: fn(String) -> ValidationError,
) -> Result<ImagePayload> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(ImagePayload::from_bytes(
            detect_image_mime(&bytes, path),
            &bytes,
        )),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(not_found(path.display().to_string()).into())
        }
        Err(e) => Err(Error::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::{MockTransport, TINY_PNG_BASE64};
    use crate::ai::types::StreamFragment;
    use crate::engine::default_candidates;
    use base64::Engine as _;
    use std::sync::Arc;

    fn tiny_png() -> Vec<u8> {
        base64::engine::general_purpose::STANDARD
            .decode(TINY_PNG_BASE64)
            .unwrap()
    }

    fn job(dir: &Path) -> TransferJob {
        let user = dir.join("me.png");
        let outfit = dir.join("look.png");
        std::fs::write(&user, tiny_png()).unwrap();
        std::fs::write(&outfit, tiny_png()).unwrap();

        TransferJob {
            user_image: user,
            outfit_image: outfit,
            output_prefix: dir.join("result").to_string_lossy().into_owned(),
            api_key: "key".to_string(),
        }
    }

    fn engine(transport: &MockTransport) -> Engine {
        Engine::new(Arc::new(transport.clone()), default_candidates())
    }

    #[tokio::test]
    async fn test_writes_numbered_files() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new().with_fragments(vec![
            StreamFragment::image("image/png", TINY_PNG_BASE64),
            StreamFragment::text("two looks"),
            StreamFragment::image("image/jpeg", TINY_PNG_BASE64),
        ]);

        let report = run_transfer(&engine(&transport), &job(dir.path()), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            report.saved,
            vec![dir.path().join("result_1.png"), dir.path().join("result_2.jpg")]
        );
        assert_eq!(std::fs::read(&report.saved[0]).unwrap(), tiny_png());
        assert_eq!(report.text, "two looks");

        let sent = &transport.calls()[0].request;
        assert_eq!(sent.inline_part_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_user_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job(dir.path());
        job.user_image = dir.path().join("absent.png");
        let transport = MockTransport::new();

        let err = run_transfer(&engine(&transport), &job, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            format!(
                "Imagen de usuario no encontrada: {}",
                dir.path().join("absent.png").display()
            )
        );
        assert_eq!(transport.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_outfit_image_keeps_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job(dir.path());
        job.outfit_image = dir.path().join("gone.jpg");

        let err = run_transfer(
            &engine(&MockTransport::new()),
            &job,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            Error::Validation(ValidationError::ReferenceImageNotFound(ref path)) if path.ends_with("gone.jpg")
        ));
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected_as_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path());
        std::fs::write(&job.user_image, b"").unwrap();
        let transport = MockTransport::new();

        let err = run_transfer(&engine(&transport), &job, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Imagen de usuario es requerida");
        assert_eq!(transport.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_text_only_answer_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let transport =
            MockTransport::new().with_fragments(vec![StreamFragment::text("no can do")]);

        let err = run_transfer(&engine(&transport), &job(dir.path()), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoImagesProduced { ref text } if text == "no can do"));
        assert!(!dir.path().join("result_1.png").exists());
    }
}
