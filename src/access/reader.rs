// ABOUTME: Reader handle: forward-only cursor with the typed getter surface
// ABOUTME: Every getter funnels through the canonical value codec; null leaves the target untouched
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::rc::Rc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::codec;
use crate::enforcer::HandleId;
use crate::errors::{AccessResult, ResourceKind, UsageError};
use crate::native::{ColumnDescriptor, NativeReader, NativeValue};

use super::AccessInner;

/// Layout of the string produced by [`Reader::get_datetime_string`]: 4-digit
/// minimum year, 9-digit zero-padded fractional seconds, offset trimmed away
/// when the backend carries none. Identical across all backends.
const DATETIME_STRING_FORMAT: &str = "YYYY-MM-DD HH:MM:SS.fffffffff zzz";

/// A forward-only cursor over one result set.
///
/// All typed getters share one template: verify the reader is still tracked,
/// resolve the column name to an ordinal, and on a database-null cell leave
/// the caller-supplied target untouched. Non-null cells convert through the
/// canonical codec, so a value that converts on one backend converts
/// identically on the others.
///
/// The `_opt` variants differ only in the target type; null leaves an
/// `Option` target untouched too, it is never overwritten with `None`.
pub struct Reader {
    access: Rc<AccessInner>,
    native: Option<Box<dyn NativeReader>>,
    id: HandleId,
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Reader {
    pub(super) fn new(access: Rc<AccessInner>, native: Box<dyn NativeReader>, id: HandleId) -> Self {
        Self {
            access,
            native: Some(native),
            id,
        }
    }

    fn verify(&self) -> Result<(), UsageError> {
        self.access.enforcer.borrow().verify_valid_reader(self.id)
    }

    fn native(&self) -> Result<&dyn NativeReader, UsageError> {
        self.native
            .as_deref()
            .ok_or_else(|| UsageError::closed(ResourceKind::Reader))
    }

    /// Advance to the next row; `false` when the result set is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed.
    pub fn advance_row(&mut self) -> AccessResult<bool> {
        self.verify()?;
        let native = self
            .native
            .as_deref_mut()
            .ok_or_else(|| UsageError::closed(ResourceKind::Reader))?;
        Ok(native.advance()?)
    }

    /// Number of columns in the result set.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed.
    pub fn field_count(&self) -> AccessResult<usize> {
        self.verify()?;
        Ok(self.native()?.field_count())
    }

    /// Name of the column at an ordinal.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed or the ordinal is
    /// out of range.
    pub fn column_name(&self, ordinal: usize) -> AccessResult<String> {
        self.verify()?;
        Ok(self.native()?.column_name(ordinal)?)
    }

    /// The native result-set schema, passed through unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed.
    pub fn schema(&self) -> AccessResult<Vec<ColumnDescriptor>> {
        self.verify()?;
        Ok(self.native()?.schema()?)
    }

    /// The fixed layout of [`Reader::get_datetime_string`] output.
    #[must_use]
    pub const fn datetime_string_format() -> &'static str {
        DATETIME_STRING_FORMAT
    }

    /// The current row's cell for a column, or `None` on a database null.
    fn cell(&self, column: &str) -> AccessResult<Option<NativeValue>> {
        self.verify()?;
        let native = self.native()?;
        let ordinal = native.ordinal(column)?;
        if native.is_null(ordinal)? {
            return Ok(None);
        }
        Ok(Some(native.value(ordinal)?))
    }

    fn read_with<T>(
        &self,
        value: &mut T,
        column: &str,
        convert: impl FnOnce(&NativeValue, &str) -> AccessResult<T>,
    ) -> AccessResult<()> {
        if let Some(cell) = self.cell(column)? {
            *value = convert(&cell, column)?;
        }
        Ok(())
    }

    fn read_opt_with<T>(
        &self,
        value: &mut Option<T>,
        column: &str,
        convert: impl FnOnce(&NativeValue, &str) -> AccessResult<T>,
    ) -> AccessResult<()> {
        if let Some(cell) = self.cell(column)? {
            *value = Some(convert(&cell, column)?);
        }
        Ok(())
    }

    /// Boolean. On backends without a native boolean type, numeric 1 reads
    /// as true and everything else as false.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell cannot be converted.
    pub fn get_bool(&self, value: &mut bool, column: &str) -> AccessResult<()> {
        let emulated = self.access.profile.emulates_boolean;
        self.read_with(value, column, |cell, col| codec::to_bool(cell, emulated, col))
    }

    /// Nullable variant of [`Reader::get_bool`].
    ///
    /// # Errors
    ///
    /// Same errors as the non-nullable variant.
    pub fn get_bool_opt(&self, value: &mut Option<bool>, column: &str) -> AccessResult<()> {
        let emulated = self.access.profile.emulates_boolean;
        self.read_opt_with(value, column, |cell, col| {
            codec::to_bool(cell, emulated, col)
        })
    }

    /// Unsigned byte, with checked narrowing.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell cannot be converted.
    pub fn get_u8(&self, value: &mut u8, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::to_u8)
    }

    /// Nullable variant of [`Reader::get_u8`].
    ///
    /// # Errors
    ///
    /// Same errors as the non-nullable variant.
    pub fn get_u8_opt(&self, value: &mut Option<u8>, column: &str) -> AccessResult<()> {
        self.read_opt_with(value, column, codec::to_u8)
    }

    /// 16-bit integer, with checked narrowing.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell cannot be converted.
    pub fn get_i16(&self, value: &mut i16, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::to_i16)
    }

    /// Nullable variant of [`Reader::get_i16`].
    ///
    /// # Errors
    ///
    /// Same errors as the non-nullable variant.
    pub fn get_i16_opt(&self, value: &mut Option<i16>, column: &str) -> AccessResult<()> {
        self.read_opt_with(value, column, codec::to_i16)
    }

    /// 32-bit integer, with checked narrowing.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell cannot be converted.
    pub fn get_i32(&self, value: &mut i32, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::to_i32)
    }

    /// Nullable variant of [`Reader::get_i32`].
    ///
    /// # Errors
    ///
    /// Same errors as the non-nullable variant.
    pub fn get_i32_opt(&self, value: &mut Option<i32>, column: &str) -> AccessResult<()> {
        self.read_opt_with(value, column, codec::to_i32)
    }

    /// 64-bit integer, with checked narrowing.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell cannot be converted.
    pub fn get_i64(&self, value: &mut i64, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::to_i64)
    }

    /// Nullable variant of [`Reader::get_i64`].
    ///
    /// # Errors
    ///
    /// Same errors as the non-nullable variant.
    pub fn get_i64_opt(&self, value: &mut Option<i64>, column: &str) -> AccessResult<()> {
        self.read_opt_with(value, column, codec::to_i64)
    }

    /// Single-precision float.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell cannot be converted.
    pub fn get_f32(&self, value: &mut f32, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::to_f32)
    }

    /// Nullable variant of [`Reader::get_f32`].
    ///
    /// # Errors
    ///
    /// Same errors as the non-nullable variant.
    pub fn get_f32_opt(&self, value: &mut Option<f32>, column: &str) -> AccessResult<()> {
        self.read_opt_with(value, column, codec::to_f32)
    }

    /// Double-precision float, widened from the generic native value.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell cannot be converted.
    pub fn get_f64(&self, value: &mut f64, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::to_f64)
    }

    /// Nullable variant of [`Reader::get_f64`].
    ///
    /// # Errors
    ///
    /// Same errors as the non-nullable variant.
    pub fn get_f64_opt(&self, value: &mut Option<f64>, column: &str) -> AccessResult<()> {
        self.read_opt_with(value, column, codec::to_f64)
    }

    /// Fixed-precision decimal. Fails with `ConversionOverflow` when the
    /// native magnitude or scale does not fit; fall back to
    /// [`Reader::get_decimal_string`] for the exact literal.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell cannot be converted.
    pub fn get_decimal(&self, value: &mut Decimal, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::to_fixed_decimal)
    }

    /// Nullable variant of [`Reader::get_decimal`].
    ///
    /// # Errors
    ///
    /// Same errors as the non-nullable variant.
    pub fn get_decimal_opt(&self, value: &mut Option<Decimal>, column: &str) -> AccessResult<()> {
        self.read_opt_with(value, column, codec::to_fixed_decimal)
    }

    /// Text.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell cannot be converted.
    pub fn get_string(&self, value: &mut String, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::to_text)
    }

    /// Nullable variant of [`Reader::get_string`].
    ///
    /// # Errors
    ///
    /// Same errors as the non-nullable variant.
    pub fn get_string_opt(&self, value: &mut Option<String>, column: &str) -> AccessResult<()> {
        self.read_opt_with(value, column, codec::to_text)
    }

    /// Raw binary data, copied out of the native cell unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell is not binary.
    pub fn get_bytes(&self, value: &mut Vec<u8>, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::to_bytes)
    }

    /// Nullable variant of [`Reader::get_bytes`].
    ///
    /// # Errors
    ///
    /// Same errors as the non-nullable variant.
    pub fn get_bytes_opt(&self, value: &mut Option<Vec<u8>>, column: &str) -> AccessResult<()> {
        self.read_opt_with(value, column, codec::to_bytes)
    }

    /// Fixed-resolution date-time. Fails with `ConversionRange` outside
    /// calendar years 1..=9999; fall back to
    /// [`Reader::get_datetime_string`], which renders any native value.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell cannot be converted.
    pub fn get_datetime(&self, value: &mut NaiveDateTime, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::to_datetime)
    }

    /// Nullable variant of [`Reader::get_datetime`].
    ///
    /// # Errors
    ///
    /// Same errors as the non-nullable variant.
    pub fn get_datetime_opt(
        &self,
        value: &mut Option<NaiveDateTime>,
        column: &str,
    ) -> AccessResult<()> {
        self.read_opt_with(value, column, codec::to_datetime)
    }

    /// The backend's exact numeric literal; never fails on magnitude or
    /// scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell is not numeric.
    pub fn get_decimal_string(&self, value: &mut String, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::decimal_literal)
    }

    /// The canonical date-time string (see
    /// [`Reader::datetime_string_format`]); never fails on calendar range.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been disposed, the column does
    /// not exist, or the cell is not a date-time.
    pub fn get_datetime_string(&self, value: &mut String, column: &str) -> AccessResult<()> {
        self.read_with(value, column, codec::datetime_string)
    }

    /// Dispose the reader, closing the native cursor.
    ///
    /// The registry re-resolves the owning command first; a registry
    /// inconsistency fails the disposal and releases nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot resolve exactly one owning
    /// command, or if the native cursor fails to close.
    pub fn dispose(&mut self) -> AccessResult<()> {
        self.access.enforcer.borrow_mut().dispose_reader(self.id)?;
        if let Some(native) = self.native.as_deref_mut() {
            native.close()?;
        }
        self.native = None;
        Ok(())
    }
}
