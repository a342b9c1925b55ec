// ABOUTME: Canonical value codec: backend-native cell values -> one backend-independent form
// ABOUTME: Checked narrowing, generic-value widening, boolean emulation; no silent precision loss
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Canonical Value Codec
//!
//! Every typed getter on a reader funnels through this module. The rules,
//! uniform across backends:
//!
//! - Integral targets narrow with range checks; out-of-range fails with
//!   `ConversionOverflow`, never wraps. Exact numerics convert only when
//!   integral.
//! - `f64` widens from the generic native value, never through an
//!   intermediate `f32` cast that would compound rounding error.
//! - Backends without a native boolean represent true as the numeric
//!   literal 1; the mapping is applied here explicitly, not by any native
//!   coercion.
//! - Date-time and exact-decimal conversions live in the submodules; each
//!   has a string companion that never fails.

use crate::errors::{AccessError, AccessResult};
use crate::native::NativeValue;

pub(crate) mod datetime;
pub(crate) mod decimal;

fn mismatch(column: &str, expected: &'static str, value: &NativeValue) -> AccessError {
    AccessError::unexpected_type(column, expected, value.type_name())
}

/// Boolean, with explicit numeric-1 emulation.
///
/// When `emulated` is set (backends without a native boolean type) only
/// numeric cells are accepted and exactly 1 means true. Otherwise a native
/// boolean passes through, and numeric cells still apply the 1-mapping so
/// tinyint-backed flags behave identically everywhere.
pub(crate) fn to_bool(value: &NativeValue, emulated: bool, column: &str) -> AccessResult<bool> {
    match value {
        NativeValue::Bool(b) if !emulated => Ok(*b),
        NativeValue::TinyInt(v) => Ok(*v == 1),
        NativeValue::SmallInt(v) => Ok(*v == 1),
        NativeValue::Int(v) => Ok(*v == 1),
        NativeValue::BigInt(v) => Ok(*v == 1),
        NativeValue::Decimal(d) => Ok(d.to_i128_exact() == Some(1)),
        other => Err(mismatch(column, "boolean or numeric", other)),
    }
}

fn to_integral(value: &NativeValue, column: &str) -> AccessResult<i128> {
    match value {
        NativeValue::TinyInt(v) => Ok(i128::from(*v)),
        NativeValue::SmallInt(v) => Ok(i128::from(*v)),
        NativeValue::Int(v) => Ok(i128::from(*v)),
        NativeValue::BigInt(v) => Ok(i128::from(*v)),
        NativeValue::Decimal(d) => {
            if d.is_fractional() {
                return Err(mismatch(column, "integral numeric", value));
            }
            d.to_i128_exact().ok_or_else(|| {
                AccessError::overflow(column, format!("'{}' exceeds 128 bits", d.literal()))
            })
        }
        other => Err(mismatch(column, "integral numeric", other)),
    }
}

fn narrowed<T>(value: &NativeValue, column: &str, target: &'static str) -> AccessResult<T>
where
    T: TryFrom<i128>,
{
    let wide = to_integral(value, column)?;
    T::try_from(wide)
        .map_err(|_| AccessError::overflow(column, format!("'{wide}' does not fit {target}")))
}

pub(crate) fn to_u8(value: &NativeValue, column: &str) -> AccessResult<u8> {
    narrowed(value, column, "u8")
}

pub(crate) fn to_i16(value: &NativeValue, column: &str) -> AccessResult<i16> {
    narrowed(value, column, "i16")
}

pub(crate) fn to_i32(value: &NativeValue, column: &str) -> AccessResult<i32> {
    narrowed(value, column, "i32")
}

pub(crate) fn to_i64(value: &NativeValue, column: &str) -> AccessResult<i64> {
    narrowed(value, column, "i64")
}

/// Double-precision widening from the generic native value.
pub(crate) fn to_f64(value: &NativeValue, column: &str) -> AccessResult<f64> {
    match value {
        NativeValue::Double(v) => Ok(*v),
        NativeValue::Float(v) => Ok(f64::from(*v)),
        NativeValue::TinyInt(v) => Ok(f64::from(*v)),
        NativeValue::SmallInt(v) => Ok(f64::from(*v)),
        NativeValue::Int(v) => Ok(f64::from(*v)),
        NativeValue::BigInt(v) => Ok(*v as f64),
        NativeValue::Decimal(d) => d
            .literal()
            .parse()
            .map_err(|_| mismatch(column, "numeric", value)),
        other => Err(mismatch(column, "numeric", other)),
    }
}

pub(crate) fn to_f32(value: &NativeValue, column: &str) -> AccessResult<f32> {
    match value {
        NativeValue::Float(v) => Ok(*v),
        other => Ok(to_f64(other, column)? as f32),
    }
}

pub(crate) fn to_text(value: &NativeValue, column: &str) -> AccessResult<String> {
    match value {
        NativeValue::Text(s) => Ok(s.clone()),
        other => Err(mismatch(column, "text", other)),
    }
}

pub(crate) fn to_bytes(value: &NativeValue, column: &str) -> AccessResult<Vec<u8>> {
    match value {
        NativeValue::Bytes(b) => Ok(b.clone()),
        other => Err(mismatch(column, "binary", other)),
    }
}

/// The fixed-resolution date-time; fails with `ConversionRange` outside the
/// canonical year range.
pub(crate) fn to_datetime(
    value: &NativeValue,
    column: &str,
) -> AccessResult<chrono::NaiveDateTime> {
    match value {
        NativeValue::DateTime(ts) => datetime::to_naive(ts, column),
        other => Err(mismatch(column, "datetime", other)),
    }
}

/// The canonical date-time string; the never-failing companion to the fixed
/// date-time getter.
pub(crate) fn datetime_string(value: &NativeValue, column: &str) -> AccessResult<String> {
    match value {
        NativeValue::DateTime(ts) => Ok(datetime::render(ts)),
        other => Err(mismatch(column, "datetime", other)),
    }
}

/// The exact numeric literal; the never-failing companion to the fixed
/// decimal getter.
pub(crate) fn decimal_literal(value: &NativeValue, column: &str) -> AccessResult<String> {
    match value {
        NativeValue::Decimal(d) => Ok(d.literal()),
        NativeValue::TinyInt(v) => Ok(v.to_string()),
        NativeValue::SmallInt(v) => Ok(v.to_string()),
        NativeValue::Int(v) => Ok(v.to_string()),
        NativeValue::BigInt(v) => Ok(v.to_string()),
        other => Err(mismatch(column, "numeric", other)),
    }
}

/// The fixed 96-bit decimal; fails with `ConversionOverflow` when the native
/// magnitude or scale does not fit.
pub(crate) fn to_fixed_decimal(
    value: &NativeValue,
    column: &str,
) -> AccessResult<rust_decimal::Decimal> {
    match value {
        NativeValue::Decimal(d) => decimal::to_decimal(d, column),
        NativeValue::TinyInt(v) => Ok(rust_decimal::Decimal::from(*v)),
        NativeValue::SmallInt(v) => Ok(rust_decimal::Decimal::from(*v)),
        NativeValue::Int(v) => Ok(rust_decimal::Decimal::from(*v)),
        NativeValue::BigInt(v) => Ok(rust_decimal::Decimal::from(*v)),
        other => Err(mismatch(column, "numeric", other)),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::native::{NativeDecimal, NativeTimestamp};

    #[test]
    fn boolean_emulation_maps_one_to_true() {
        let one = NativeValue::Decimal(NativeDecimal::new(false, "1", 0));
        let two = NativeValue::Decimal(NativeDecimal::new(false, "2", 0));
        assert!(to_bool(&one, true, "c").unwrap());
        assert!(!to_bool(&two, true, "c").unwrap());
        assert!(!to_bool(&NativeValue::Int(0), true, "c").unwrap());
    }

    #[test]
    fn emulating_backends_reject_native_booleans() {
        let err = to_bool(&NativeValue::Bool(true), true, "c").unwrap_err();
        assert!(matches!(err, AccessError::UnexpectedType { .. }));
        assert!(to_bool(&NativeValue::Bool(true), false, "c").unwrap());
    }

    #[test]
    fn narrowing_checks_the_range() {
        assert_eq!(to_i16(&NativeValue::Int(1234), "c").unwrap(), 1234);
        let err = to_i16(&NativeValue::Int(40_000), "c").unwrap_err();
        assert!(matches!(err, AccessError::ConversionOverflow { .. }));
        let err = to_i32(&NativeValue::BigInt(i64::MAX), "c").unwrap_err();
        assert!(matches!(err, AccessError::ConversionOverflow { .. }));
    }

    #[test]
    fn integral_getters_reject_fractional_decimals() {
        let frac = NativeValue::Decimal(NativeDecimal::new(false, "15", 1));
        let err = to_i32(&frac, "c").unwrap_err();
        assert!(matches!(err, AccessError::UnexpectedType { .. }));
    }

    #[test]
    fn double_widens_from_the_generic_value() {
        let third = NativeValue::Decimal(NativeDecimal::new(false, "333333333333333333", 18));
        let wide = to_f64(&third, "c").unwrap();
        // widening through f32 would flatten this tail
        assert!((wide - 0.333_333_333_333_333_33).abs() < 1e-15);
        assert!((to_f64(&NativeValue::Float(1.5), "c").unwrap() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn non_numeric_cells_are_rejected_with_both_names() {
        let cell = NativeValue::DateTime(NativeTimestamp::new(2020, 1, 1, 0, 0, 0, 0));
        let err = to_f64(&cell, "when").unwrap_err();
        assert_eq!(
            err.to_string(),
            "column 'when': expected numeric, found datetime"
        );
    }
}
