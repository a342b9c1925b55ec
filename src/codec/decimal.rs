// ABOUTME: Exact-numeric side of the canonical value codec
// ABOUTME: Arbitrary-precision native decimal -> fixed 96-bit decimal, overflow made explicit
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical decimal conversions.
//!
//! Backends carry up to 38 significant digits (Oracle NUMBER); the fixed
//! type is [`rust_decimal::Decimal`] with a 96-bit mantissa and scale
//! 0..=28. A native value whose magnitude or scale does not fit fails with
//! `ConversionOverflow` — never a rounded result. The string accessor
//! ([`NativeDecimal::literal`]) is the fallback and reproduces the backend's
//! exact literal.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::{AccessError, AccessResult};
use crate::native::NativeDecimal;

/// Convert a native exact numeric into the fixed decimal type.
pub(crate) fn to_decimal(value: &NativeDecimal, column: &str) -> AccessResult<Decimal> {
    let literal = value.literal();
    let wanted = normalized(&literal);
    Decimal::from_str(&literal)
        .ok()
        .filter(|parsed| normalized(&parsed.to_string()) == wanted)
        .ok_or_else(|| {
            AccessError::overflow(column, format!("'{literal}' does not fit 96-bit decimal"))
        })
}

// `Decimal::from_str` rounds excess fractional digits instead of failing;
// comparing the round-trip against the normalized input catches that and
// turns it into an overflow, because silent precision loss is exactly what
// this codec exists to prevent.
fn normalized(literal: &str) -> String {
    if !literal.contains('.') {
        return literal.to_owned();
    }
    let trimmed = literal.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn representable_values_convert_exactly() {
        let value = NativeDecimal::new(true, "1234567890123456789012345678", 10);
        let converted = to_decimal(&value, "c").unwrap();
        assert_eq!(converted.to_string(), "-123456789012345678.9012345678");
    }

    #[test]
    fn magnitude_overflow_is_explicit() {
        // 38 nines: legal Oracle NUMBER, beyond the 96-bit mantissa
        let value = NativeDecimal::new(false, "9".repeat(38), 0);
        let err = to_decimal(&value, "c").unwrap_err();
        assert!(matches!(err, AccessError::ConversionOverflow { .. }));
        assert_eq!(value.literal(), "9".repeat(38));
    }

    #[test]
    fn scale_overflow_is_explicit_not_rounded() {
        // 30 fractional digits cannot be held at scale <= 28
        let value = NativeDecimal::new(false, format!("1{}", "3".repeat(30)), 30);
        let err = to_decimal(&value, "c").unwrap_err();
        assert!(matches!(err, AccessError::ConversionOverflow { .. }));
    }

    #[test]
    fn trailing_fractional_zeros_still_fit() {
        // scale 30 but only zeros past position 2; numerically representable
        let value = NativeDecimal::new(false, format!("125{}", "0".repeat(28)), 30);
        let converted = to_decimal(&value, "c").unwrap();
        assert_eq!(converted, Decimal::from_str("1.25").unwrap());
    }

    #[test]
    fn negative_scale_expands_before_converting() {
        let value = NativeDecimal::new(false, "42", -3);
        assert_eq!(to_decimal(&value, "c").unwrap(), Decimal::from(42_000));
    }
}
