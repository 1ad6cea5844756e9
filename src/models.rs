//! Data models and structures
//!
//! Defines the request-side data carried through the generation engine and the
//! runtime configuration loaded from the environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// An image supplied by the caller, as base64 text plus its MIME type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encode raw image bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        use base64::Engine as _;
        Self::new(
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(bytes),
        )
    }

    pub fn is_blank(&self) -> bool {
        self.mime_type.trim().is_empty() || self.data.trim().is_empty()
    }
}

/// Output kinds requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modalities {
    pub want_images: bool,
    pub want_text: bool,
}

impl Modalities {
    pub const IMAGE_AND_TEXT: Self = Self {
        want_images: true,
        want_text: true,
    };

    pub const TEXT_ONLY: Self = Self {
        want_images: false,
        want_text: true,
    };
}

/// A validated outfit transfer request. Built once per inbound call by
/// [`crate::engine::build_request`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub(crate) credential: String,
    pub(crate) subject_image: ImagePayload,
    pub(crate) reference_image: ImagePayload,
    pub(crate) prompt_text: String,
    pub(crate) modalities: Modalities,
    pub(crate) temperature: f32,
    pub(crate) max_output_tokens: u32,
}

impl GenerationRequest {
    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn subject_image(&self) -> &ImagePayload {
        &self.subject_image
    }

    pub fn reference_image(&self) -> &ImagePayload {
        &self.reference_image
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn modalities(&self) -> Modalities {
        self.modalities
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }
}

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_IMAGE_MODELS: [&str; 2] =
    ["gemini-2.5-flash-image-preview", "gemini-2.0-flash-image"];
pub const DEFAULT_TEXT_FALLBACK_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub static_dir: String,
    pub gemini_base_url: String,
    pub image_models: Vec<String>,
    pub text_fallback_model: String,
    pub connect_timeout: Duration,
    pub max_body_bytes: usize,
    /// Only consulted by the CLI `transfer` command.
    pub default_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            static_dir: "public".to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            image_models: DEFAULT_IMAGE_MODELS.iter().map(|m| m.to_string()).collect(),
            text_fallback_model: DEFAULT_TEXT_FALLBACK_MODEL.to_string(),
            connect_timeout: Duration::from_secs(30),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            default_api_key: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = match var("HOST") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("HOST is not an IP address: {}", raw)))?,
            None => defaults.host,
        };

        let image_models = match var("GEMINI_IMAGE_MODELS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.image_models,
        };

        Ok(Self {
            host,
            port: parse_var(&var, "PORT")?.unwrap_or(defaults.port),
            static_dir: var("STATIC_DIR").unwrap_or(defaults.static_dir),
            gemini_base_url: var("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_base_url),
            image_models,
            text_fallback_model: var("GEMINI_TEXT_FALLBACK_MODEL")
                .unwrap_or(defaults.text_fallback_model),
            connect_timeout: parse_var::<u64, _>(&var, "GEMINI_CONNECT_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            max_body_bytes: parse_var(&var, "MAX_BODY_BYTES")?.unwrap_or(defaults.max_body_bytes),
            default_api_key: var("GOOGLE_AI_API_KEY"),
        })
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw)))
        })
        .transpose()
}
