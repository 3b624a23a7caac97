//! Supported barcode symbologies and check-digit validation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Barcode families the decoder may be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbology {
    #[serde(rename = "ean-13")]
    Ean13,
    #[serde(rename = "ean-8")]
    Ean8,
    #[serde(rename = "upc-a")]
    UpcA,
    #[serde(rename = "upc-e")]
    UpcE,
    #[serde(rename = "code-128")]
    Code128,
    #[serde(rename = "code-39")]
    Code39,
}

impl Symbology {
    /// Retail product codes plus Code 128
    pub const RETAIL: [Self; 5] = [
        Self::Ean13,
        Self::Ean8,
        Self::UpcA,
        Self::UpcE,
        Self::Code128,
    ];

    /// Whether codes of this family end in a mod-10 check digit
    #[inline]
    #[must_use]
    pub fn has_check_digit(self) -> bool {
        matches!(self, Self::Ean13 | Self::Ean8 | Self::UpcA | Self::UpcE)
    }

    /// Expected digit count for fixed-length families
    #[must_use]
    pub fn fixed_length(self) -> Option<usize> {
        match self {
            Self::Ean13 => Some(13),
            Self::Ean8 | Self::UpcE => Some(8),
            Self::UpcA => Some(12),
            Self::Code128 | Self::Code39 => None,
        }
    }

    /// Check a decoded payload against this family's structure
    #[must_use]
    pub fn accepts(self, code: &str) -> bool {
        if code.is_empty() {
            return false;
        }
        if let Some(len) = self.fixed_length() {
            if code.len() != len || !code.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
        }
        match self {
            Self::UpcE => upc_e_to_upc_a(code).is_some_and(|a| mod10_valid(&a)),
            s if s.has_check_digit() => mod10_valid(code),
            _ => true,
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ean13 => "EAN-13",
            Self::Ean8 => "EAN-8",
            Self::UpcA => "UPC-A",
            Self::UpcE => "UPC-E",
            Self::Code128 => "Code 128",
            Self::Code39 => "Code 39",
        };
        f.write_str(name)
    }
}

/// GS1 mod-10 check over a digit string whose last digit is the check digit
#[must_use]
pub fn mod10_valid(code: &str) -> bool {
    let digits: Option<Vec<u32>> = code.chars().map(|c| c.to_digit(10)).collect();
    let Some(digits) = digits else {
        return false;
    };
    let Some((check, body)) = digits.split_last() else {
        return false;
    };
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();
    (10 - sum % 10) % 10 == *check
}

/// Expand an 8-digit UPC-E (number system, 6 digits, check) to UPC-A
#[must_use]
pub fn upc_e_to_upc_a(code: &str) -> Option<String> {
    let d: Vec<char> = code.chars().collect();
    if d.len() != 8 || !matches!(d[0], '0' | '1') {
        return None;
    }
    let (ns, m, check) = (d[0], &d[1..7], d[7]);
    let body: String = match m[5] {
        '0' | '1' | '2' => [m[0], m[1], m[5], '0', '0', '0', '0', m[2], m[3], m[4]]
            .iter()
            .collect(),
        '3' => [m[0], m[1], m[2], '0', '0', '0', '0', '0', m[3], m[4]]
            .iter()
            .collect(),
        '4' => [m[0], m[1], m[2], m[3], '0', '0', '0', '0', '0', m[4]]
            .iter()
            .collect(),
        _ => [m[0], m[1], m[2], m[3], m[4], '0', '0', '0', '0', m[5]]
            .iter()
            .collect(),
    };
    Some(format!("{ns}{body}{check}"))
}
