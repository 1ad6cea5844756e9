//! Fixed instruction templates sent to the provider.

/// Instruction sent alongside the subject and reference images.
pub const OUTFIT_TRANSFER: &str = include_str!("../data/prompts/outfit_transfer.txt");

/// Text-only request used by the degraded fallback candidate.
pub const TEXT_FALLBACK: &str = include_str!("../data/prompts/text_fallback.txt");
