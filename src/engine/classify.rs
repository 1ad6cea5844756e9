//! Mapping of provider failures onto a closed set of user-facing categories.
//!
//! Providers give no structured error code, so classification is an ordered
//! table of case-sensitive substring rules over the failure description. The
//! first matching rule wins; anything unmatched is an internal error.

use crate::Error;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    InvalidCredential,
    QuotaExceeded,
    InsufficientPermission,
    RateLimited,
    ModelUnavailable,
    NetworkError,
    Timeout,
    InternalError,
}

impl ErrorCategory {
    pub fn http_status(self) -> u16 {
        match self {
            Self::InvalidCredential => 401,
            Self::QuotaExceeded | Self::RateLimited => 429,
            Self::InsufficientPermission => 403,
            Self::ModelUnavailable | Self::NetworkError => 503,
            Self::Timeout => 408,
            Self::InternalError => 500,
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            Self::InvalidCredential => "API Key inválida. Verifica tu clave de Google AI Studio",
            Self::QuotaExceeded => "Cuota de API excedida. Revisa tu límite en Google AI Studio",
            Self::InsufficientPermission => {
                "Permisos insuficientes. Verifica la configuración de tu API Key"
            }
            Self::RateLimited => {
                "Demasiadas solicitudes. Espera un momento antes de intentar nuevamente"
            }
            Self::ModelUnavailable => "Modelo no disponible. Intenta nuevamente más tarde",
            Self::NetworkError => "Error de conexión. Verifica tu conexión a internet",
            Self::Timeout => "Tiempo de espera agotado. La generación tomó demasiado tiempo",
            Self::InternalError => "Error interno del servidor",
        }
    }
}

/// Checked top to bottom.
const RULES: [(&str, ErrorCategory); 7] = [
    ("API key", ErrorCategory::InvalidCredential),
    ("quota", ErrorCategory::QuotaExceeded),
    ("permission", ErrorCategory::InsufficientPermission),
    ("rate", ErrorCategory::RateLimited),
    ("model", ErrorCategory::ModelUnavailable),
    ("network", ErrorCategory::NetworkError),
    ("timeout", ErrorCategory::Timeout),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub http_status: u16,
    pub user_message: &'static str,
    /// Provider text, for diagnostics only.
    pub raw_detail: String,
}

pub fn classify(failure: &Error) -> ClassifiedError {
    classify_description(&failure.to_string())
}

pub fn classify_description(description: &str) -> ClassifiedError {
    let category = RULES
        .iter()
        .find(|(needle, _)| description.contains(*needle))
        .map(|(_, category)| *category)
        .unwrap_or(ErrorCategory::InternalError);

    ClassifiedError {
        category,
        http_status: category.http_status(),
        user_message: category.user_message(),
        raw_detail: description.to_string(),
    }
}
