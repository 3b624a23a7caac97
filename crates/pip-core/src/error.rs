//! Error types for the shared core

/// Errors raised while validating core values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Barcode was empty after trimming
    #[error("empty barcode")]
    EmptyBarcode,

    /// Model reference was empty or not URL-safe
    #[error("invalid model reference: {0:?}")]
    InvalidModelReference(String),
}
