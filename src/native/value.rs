// ABOUTME: Backend-native cell value representations carried across the native boundary
// ABOUTME: High-precision timestamp and arbitrary-precision decimal forms, lossless until the codec runs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Native cell values.
//!
//! Drivers hand cell values to this layer in these forms, which preserve the
//! backend's full precision: a timestamp keeps its civil fields plus nine
//! digits of fractional seconds and an optional zone offset, a numeric keeps
//! its exact digit string and scale. Nothing is narrowed or rounded until the
//! codec converts into a canonical fixed-width type on caller request.

/// A backend-native date-time value, split into civil fields.
///
/// `year` may be zero or negative for BCE dates (Oracle stores these); the
/// codec rejects them for the fixed-resolution getter but the canonical
/// string rendering handles them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeTimestamp {
    /// Calendar year; zero or negative means BCE.
    pub year: i32,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month, 1-31.
    pub day: u8,
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-59.
    pub second: u8,
    /// Fractional seconds in nanoseconds, 0..1_000_000_000.
    pub nanos: u32,
    /// Zone offset in minutes east of UTC; `None` when the backend type
    /// carries no zone.
    pub offset_minutes: Option<i16>,
}

impl NativeTimestamp {
    /// A zoneless timestamp.
    #[must_use]
    pub const fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        nanos: u32,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            nanos,
            offset_minutes: None,
        }
    }

    /// The same timestamp with a zone offset attached.
    #[must_use]
    pub const fn with_offset(mut self, offset_minutes: i16) -> Self {
        self.offset_minutes = Some(offset_minutes);
        self
    }
}

/// A backend-native exact numeric: sign, unscaled digit string, and scale.
///
/// `digits` is the unscaled magnitude with no sign and no separator (e.g.
/// Oracle NUMBER's up-to-38 significant digits). `scale` counts digits to the
/// right of the decimal point; a negative scale (Oracle permits down to -84)
/// multiplies by powers of ten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeDecimal {
    /// True when the value is negative.
    pub negative: bool,
    /// Unscaled magnitude as ASCII decimal digits.
    pub digits: String,
    /// Digits to the right of the decimal point; negative shifts left.
    pub scale: i32,
}

impl NativeDecimal {
    /// Build from parts. Non-digit characters in `digits` are a caller bug
    /// surfaced later as a conversion failure, not a panic.
    #[must_use]
    pub fn new(negative: bool, digits: impl Into<String>, scale: i32) -> Self {
        Self {
            negative,
            digits: digits.into(),
            scale,
        }
    }

    /// The exact textual literal, exactly as the backend would print it.
    ///
    /// This is the value returned by the never-failing string accessor; it
    /// reproduces every significant digit.
    #[must_use]
    pub fn literal(&self) -> String {
        let digits = self.digits.trim_start_matches('0');
        let digits = if digits.is_empty() { "0" } else { digits };
        let sign = if self.negative && digits != "0" { "-" } else { "" };

        if self.scale <= 0 {
            // negative scale appends zeros
            let zeros = "0".repeat(self.scale.unsigned_abs() as usize);
            return format!("{sign}{digits}{zeros}");
        }

        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            format!("{sign}{int_part}.{frac_part}")
        } else {
            let leading = "0".repeat(scale - digits.len());
            format!("{sign}0.{leading}{digits}")
        }
    }

    /// The exact integral value, if this decimal has no fractional part and
    /// fits in an `i128`. Trailing fractional zeros count as integral.
    #[must_use]
    pub fn to_i128_exact(&self) -> Option<i128> {
        let unscaled: i128 = self.digits.parse().ok()?;
        let magnitude = if self.scale > 0 {
            let divisor = 10_i128.checked_pow(u32::try_from(self.scale).ok()?)?;
            if unscaled % divisor != 0 {
                return None;
            }
            unscaled / divisor
        } else {
            let factor = 10_i128.checked_pow(self.scale.unsigned_abs())?;
            unscaled.checked_mul(factor)?
        };
        if self.negative {
            magnitude.checked_neg()
        } else {
            Some(magnitude)
        }
    }

    /// Whether the value has digits after the decimal point.
    #[must_use]
    pub fn is_fractional(&self) -> bool {
        if self.scale <= 0 {
            return false;
        }
        let scale = self.scale as usize;
        let tail = if self.digits.len() >= scale {
            &self.digits[self.digits.len() - scale..]
        } else {
            &self.digits[..]
        };
        tail.bytes().any(|b| b != b'0')
    }
}

/// One cell value as produced by a native driver.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// Database null (also: no rows, for scalar execution).
    Null,
    /// A native boolean, on backends that have one.
    Bool(bool),
    /// Unsigned 8-bit integer.
    TinyInt(u8),
    /// 16-bit integer.
    SmallInt(i16),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    BigInt(i64),
    /// Single-precision float.
    Float(f32),
    /// Double-precision float.
    Double(f64),
    /// Exact numeric at the backend's full precision.
    Decimal(NativeDecimal),
    /// Character data.
    Text(String),
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// Date-time at the backend's full precision.
    DateTime(NativeTimestamp),
}

impl NativeValue {
    /// Short name of the type family, used in conversion diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::TinyInt(_) => "tinyint",
            Self::SmallInt(_) => "smallint",
            Self::Int(_) => "int",
            Self::BigInt(_) => "bigint",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Bytes(_) => "binary",
            Self::DateTime(_) => "datetime",
        }
    }

    /// Whether this cell is a database null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn literal_places_the_point() {
        assert_eq!(NativeDecimal::new(false, "12345", 2).literal(), "123.45");
        assert_eq!(NativeDecimal::new(true, "12345", 2).literal(), "-123.45");
        assert_eq!(NativeDecimal::new(false, "45", 4).literal(), "0.0045");
        assert_eq!(NativeDecimal::new(false, "45", 0).literal(), "45");
        assert_eq!(NativeDecimal::new(false, "45", -3).literal(), "45000");
    }

    #[test]
    fn literal_normalizes_zero() {
        assert_eq!(NativeDecimal::new(true, "000", 0).literal(), "0");
        assert_eq!(NativeDecimal::new(false, "0007", 1).literal(), "0.7");
    }

    #[test]
    fn exact_integer_conversion() {
        assert_eq!(
            NativeDecimal::new(false, "4200", 2).to_i128_exact(),
            Some(42)
        );
        assert_eq!(NativeDecimal::new(true, "7", 0).to_i128_exact(), Some(-7));
        assert_eq!(NativeDecimal::new(false, "7", -2).to_i128_exact(), Some(700));
        assert_eq!(NativeDecimal::new(false, "405", 1).to_i128_exact(), None);
    }

    #[test]
    fn fractional_detection_ignores_trailing_zeros() {
        assert!(NativeDecimal::new(false, "405", 1).is_fractional());
        assert!(!NativeDecimal::new(false, "400", 2).is_fractional());
        assert!(!NativeDecimal::new(false, "4", -2).is_fractional());
    }
}
