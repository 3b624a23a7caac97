//! Core types shared across components
//!
//! Defines:
//! - Barcode values as delivered by decoders
//! - Catalog products and their model references
//! - Poses used by hit testing, the reticle and model placement

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded barcode payload
///
/// Decoders may deliver either text or a plain number. Both normalize to the
/// same lookup key via [`BarcodeValue::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BarcodeValue {
    /// Textual payload (EAN/UPC digits keep their leading zeros)
    Text(String),
    /// Numeric payload
    Number(u64),
}

impl BarcodeValue {
    /// Normalized lookup key
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
        }
    }

    /// Validate that the payload is usable as a lookup key
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.key().is_empty() {
            return Err(CoreError::EmptyBarcode);
        }
        Ok(())
    }
}

impl fmt::Display for BarcodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<&str> for BarcodeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for BarcodeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<u64> for BarcodeValue {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

/// Result of a single detection event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Decoded payload
    pub code: BarcodeValue,
}

impl ScanResult {
    /// Create a scan result
    #[inline]
    #[must_use]
    pub fn new(code: impl Into<BarcodeValue>) -> Self {
        Self { code: code.into() }
    }
}

impl From<&str> for ScanResult {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<u64> for ScanResult {
    fn from(code: u64) -> Self {
        Self::new(code)
    }
}

/// Reference to a model held by model storage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelReference(String);

impl ModelReference {
    /// Create a model reference
    ///
    /// References are URL-safe identifiers: ASCII alphanumerics, `-`, `_`
    /// and `.`, but never `..`.
    pub fn new(reference: impl Into<String>) -> Result<Self, CoreError> {
        let reference = reference.into();
        let trimmed = reference.trim();
        let url_safe = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if trimmed.is_empty() || !url_safe || trimmed.contains("..") {
            return Err(CoreError::InvalidModelReference(reference));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ModelReference {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModelReference> for String {
    fn from(reference: ModelReference) -> Self {
        reference.0
    }
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Barcode as stored in the catalog
    pub barcode: String,
    /// Display name
    pub name: String,
    /// Model shown when the product is previewed
    pub model_reference: ModelReference,
}

impl Product {
    /// Create new product
    #[inline]
    #[must_use]
    pub fn new(
        barcode: impl Into<String>,
        name: impl Into<String>,
        model_reference: ModelReference,
    ) -> Self {
        Self {
            barcode: barcode.into(),
            name: name.into(),
            model_reference,
        }
    }

    /// Lookup key matching [`BarcodeValue::key`]
    #[must_use]
    pub fn barcode_key(&self) -> String {
        self.barcode.trim().to_string()
    }
}

/// Three-component vector in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Unit quaternion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Position plus orientation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    #[inline]
    #[must_use]
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at a position with identity orientation
    #[inline]
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barcode_keys_normalize() {
        assert_eq!(BarcodeValue::from(" 4006381333931 ").key(), "4006381333931");
        assert_eq!(BarcodeValue::from(4_006_381_333_931_u64).key(), "4006381333931");
        assert_eq!(
            BarcodeValue::from("4006381333931").key(),
            BarcodeValue::from(4_006_381_333_931_u64).key()
        );
    }

    #[test]
    fn barcode_validation() {
        assert_eq!(BarcodeValue::from("   ").validate(), Err(CoreError::EmptyBarcode));
        assert!(BarcodeValue::from("12").validate().is_ok());
    }

    #[test]
    fn scan_result_deserializes_text_and_number() {
        let text: ScanResult = serde_json::from_str(r#"{"code":"012345678905"}"#).unwrap();
        assert_eq!(text.code.key(), "012345678905");

        let number: ScanResult = serde_json::from_str(r#"{"code":12345}"#).unwrap();
        assert_eq!(number.code, BarcodeValue::Number(12345));
    }

    #[test]
    fn model_reference_rejects_paths() {
        assert!(ModelReference::new("m1").is_ok());
        assert!(ModelReference::new("").is_err());
        assert!(ModelReference::new("../m1").is_err());
        assert!(ModelReference::new("a b").is_err());
        assert!(ModelReference::new("..").is_err());
        assert!(ModelReference::new("5f1c2e.glb").is_ok());
        assert_eq!(ModelReference::new(" m2 ").unwrap().as_str(), "m2");
    }

    #[test]
    fn product_json_shape() {
        let product: Product = serde_json::from_str(
            r#"{"barcode":"012345678905","name":"Widget","modelReference":"m1"}"#,
        )
        .unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.model_reference.as_str(), "m1");
        assert_eq!(product.barcode_key(), "012345678905");

        let bad = serde_json::from_str::<Product>(
            r#"{"barcode":"1","name":"Bad","modelReference":"../etc"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn pose_defaults_to_identity() {
        let pose = Pose::default();
        assert_eq!(pose.orientation, Quat::IDENTITY);
        assert_eq!(Pose::at(Vec3::new(1.0, 0.0, -2.0)).position.z, -2.0);
    }
}
