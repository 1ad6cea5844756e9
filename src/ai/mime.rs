use std::path::Path;

const FALLBACK_MIME: &str = "image/jpeg";

/// Sniff a supported image format from its leading bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

/// MIME type for an image file: magic bytes first, then the file extension.
pub fn detect_image_mime(bytes: &[u8], path: &Path) -> String {
    if let Some(mime) = sniff_image_mime(bytes) {
        return mime.to_string();
    }

    match mime_guess::from_path(path).first() {
        Some(guess) if guess.type_() == mime_guess::mime::IMAGE => guess.essence_str().to_string(),
        _ => {
            tracing::warn!(
                "Unrecognized image format for {} (first 4 bytes: {:02X?}), falling back to {}",
                path.display(),
                &bytes[..bytes.len().min(4)],
                FALLBACK_MIME
            );
            FALLBACK_MIME.to_string()
        }
    }
}

/// File extension to use when saving an image of the given MIME type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}
