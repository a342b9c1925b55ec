// ABOUTME: Date-time side of the canonical value codec
// ABOUTME: Native timestamp -> chrono conversion plus the fixed canonical string rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical date-time conversions.
//!
//! The fixed-resolution getter produces a [`chrono::NaiveDateTime`] built
//! from the native civil fields; a zone offset carried by the backend type is
//! not applied (no silent timezone arithmetic — the string rendering
//! preserves it instead). Values outside the canonical year range 1..=9999
//! fail with `ConversionRange`; the date component is never clamped or
//! truncated.
//!
//! The string rendering `YYYY-MM-DD HH:MM:SS.fffffffff zzz` always succeeds,
//! including for BCE years the fixed type rejects, and is identical across
//! all backends: 4-digit-minimum year, 9-digit zero-padded fractional
//! seconds, `+HH:MM`/`-HH:MM` offset trimmed away when the backend carries
//! none.

use chrono::{NaiveDate, NaiveDateTime};

use crate::errors::{AccessError, AccessResult};
use crate::native::NativeTimestamp;

/// Lowest calendar year the fixed-resolution date-time type represents.
pub(crate) const MIN_YEAR: i32 = 1;
/// Highest calendar year the fixed-resolution date-time type represents.
pub(crate) const MAX_YEAR: i32 = 9999;

/// Convert a native timestamp into the fixed-resolution date-time type.
///
/// Fractional seconds survive at full nanosecond resolution, so nothing is
/// truncated on this path; the only failures are calendar-range failures.
pub(crate) fn to_naive(ts: &NativeTimestamp, column: &str) -> AccessResult<NaiveDateTime> {
    if ts.year < MIN_YEAR || ts.year > MAX_YEAR {
        return Err(AccessError::range(
            column,
            format!("year {} is outside {MIN_YEAR}..={MAX_YEAR}", ts.year),
        ));
    }
    NaiveDate::from_ymd_opt(ts.year, u32::from(ts.month), u32::from(ts.day))
        .and_then(|date| {
            date.and_hms_nano_opt(
                u32::from(ts.hour),
                u32::from(ts.minute),
                u32::from(ts.second),
                ts.nanos,
            )
        })
        .ok_or_else(|| {
            AccessError::range(
                column,
                format!(
                    "invalid calendar fields {:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:09}",
                    ts.year, ts.month, ts.day, ts.hour, ts.minute, ts.second, ts.nanos
                ),
            )
        })
}

/// Render the canonical date-time string. Never fails; this is the stable
/// cross-backend contract callers may persist and compare.
pub(crate) fn render(ts: &NativeTimestamp) -> String {
    let year = if ts.year < 0 {
        format!("-{:04}", -ts.year)
    } else {
        format!("{:04}", ts.year)
    };
    let zone = ts.offset_minutes.map_or_else(String::new, render_offset);
    format!(
        "{year}-{:02}-{:02} {:02}:{:02}:{:02}.{:09} {zone}",
        ts.month, ts.day, ts.hour, ts.minute, ts.second, ts.nanos
    )
    .trim_end()
    .to_owned()
}

fn render_offset(offset_minutes: i16) -> String {
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let magnitude = offset_minutes.unsigned_abs();
    format!("{sign}{:02}:{:02}", magnitude / 60, magnitude % 60)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn conversion_keeps_full_nanosecond_resolution() {
        let ts = NativeTimestamp::new(2008, 12, 31, 23, 59, 59, 123_456_789);
        let dt = to_naive(&ts, "c").unwrap();
        assert_eq!(dt.year(), 2008);
        assert_eq!(dt.nanosecond(), 123_456_789);
    }

    #[test]
    fn bce_year_is_out_of_range_never_clamped() {
        let ts = NativeTimestamp::new(-47, 3, 15, 12, 0, 0, 0);
        let err = to_naive(&ts, "c").unwrap_err();
        assert!(matches!(err, AccessError::ConversionRange { .. }));
    }

    #[test]
    fn year_bounds_are_inclusive() {
        assert!(to_naive(&NativeTimestamp::new(1, 1, 1, 0, 0, 0, 0), "c").is_ok());
        assert!(to_naive(&NativeTimestamp::new(9999, 12, 31, 23, 59, 59, 0), "c").is_ok());
        assert!(to_naive(&NativeTimestamp::new(10_000, 1, 1, 0, 0, 0, 0), "c").is_err());
        assert!(to_naive(&NativeTimestamp::new(0, 1, 1, 0, 0, 0, 0), "c").is_err());
    }

    #[test]
    fn invalid_calendar_day_is_a_range_error() {
        let err = to_naive(&NativeTimestamp::new(2023, 2, 30, 0, 0, 0, 0), "c").unwrap_err();
        assert!(matches!(err, AccessError::ConversionRange { .. }));
    }

    #[test]
    fn rendering_without_zone_trims_the_trailing_space() {
        let ts = NativeTimestamp::new(2014, 7, 9, 8, 5, 3, 1_200);
        assert_eq!(render(&ts), "2014-07-09 08:05:03.000001200");
    }

    #[test]
    fn rendering_with_zone_keeps_the_offset() {
        let east = NativeTimestamp::new(2014, 7, 9, 8, 5, 3, 0).with_offset(330);
        assert_eq!(render(&east), "2014-07-09 08:05:03.000000000 +05:30");

        let west = NativeTimestamp::new(2014, 7, 9, 8, 5, 3, 0).with_offset(-480);
        assert_eq!(render(&west), "2014-07-09 08:05:03.000000000 -08:00");

        let utc = NativeTimestamp::new(2014, 7, 9, 8, 5, 3, 0).with_offset(0);
        assert_eq!(render(&utc), "2014-07-09 08:05:03.000000000 +00:00");
    }

    #[test]
    fn rendering_succeeds_outside_the_fixed_range() {
        let ts = NativeTimestamp::new(-47, 3, 15, 12, 0, 0, 500_000_000);
        assert_eq!(render(&ts), "-0047-03-15 12:00:00.500000000");
    }
}
