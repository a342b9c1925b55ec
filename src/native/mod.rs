// ABOUTME: The native-primitive boundary: traits a backend client library plugs into
// ABOUTME: Connect, execute, read-row, commit/rollback, each returned as an object-safe handle
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Native Boundary
//!
//! The wire protocol to each database lives outside this crate, behind these
//! traits. A driver integration (or a test fake) implements them and is
//! registered with the [`AccessFactory`](crate::factory::AccessFactory)
//! through a [`NativeConnector`].
//!
//! The boundary is deliberately primitive: connect, execute, advance a
//! forward-only cursor, commit/rollback. Everything stateful above it —
//! which handles are still legal to use, what order operations may run in —
//! is this crate's job, and the traits here are never called before the
//! usage enforcer has approved the transition.
//!
//! Calls are synchronous and block until the native client returns. Errors
//! cross this boundary as [`NativeError`] and propagate unchanged.

use crate::errors::NativeError;

pub mod value;

pub use value::{NativeDecimal, NativeTimestamp, NativeValue};

/// Backend options applied when a native command is created.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandOptions {
    /// Bind parameters by name rather than position (Oracle sets this).
    pub bind_by_name: bool,
}

/// One column of the native result-set schema, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Backend-native type name, verbatim.
    pub type_name: String,
    /// Whether the column admits nulls, when the backend reports it.
    pub nullable: Option<bool>,
    /// Numeric precision, when the backend reports it.
    pub precision: Option<u8>,
    /// Numeric scale, when the backend reports it.
    pub scale: Option<i16>,
}

/// Entry point a driver integration registers with the factory.
///
/// Mirrors the role of a vendor provider factory: a thin seam that exists so
/// connections can be faked in tests without a live database.
pub trait NativeConnector {
    /// Open a native connection. The connection string is passed through
    /// verbatim; this layer does not parse it.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn connect(&self, connection_string: &str) -> Result<Box<dyn NativeConnection>, NativeError>;
}

/// An open native connection.
pub trait NativeConnection {
    /// The server version string, if the client library reports one.
    fn server_version(&self) -> Option<String>;

    /// Begin a native transaction at the given backend-native isolation
    /// token (produced by the per-backend mapping tables).
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn begin(&mut self, isolation: &'static str) -> Result<Box<dyn NativeTransaction>, NativeError>;

    /// Create a native command. The command runs inside the connection's
    /// active transaction, if one is open.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn create_command(
        &mut self,
        options: CommandOptions,
    ) -> Result<Box<dyn NativeCommand>, NativeError>;

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn close(&mut self) -> Result<(), NativeError>;
}

/// A native transaction.
pub trait NativeTransaction {
    /// Commit the native transaction.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn commit(&mut self) -> Result<(), NativeError>;

    /// Roll the native transaction back.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn rollback(&mut self) -> Result<(), NativeError>;
}

/// A native command.
pub trait NativeCommand {
    /// Replace the command text.
    fn set_text(&mut self, text: &str);

    /// Current command text.
    fn text(&self) -> &str;

    /// Set how the text is interpreted, as the backend-native command-type
    /// token (produced by the per-backend mapping tables).
    fn set_kind(&mut self, kind: &'static str);

    /// Current backend-native command-type token.
    fn kind(&self) -> &str;

    /// Set the execution timeout in seconds, passed through to the client.
    fn set_timeout(&mut self, seconds: u32);

    /// Current execution timeout in seconds.
    fn timeout(&self) -> u32;

    /// Execute and return the affected row count.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn execute_non_query(&mut self) -> Result<u64, NativeError>;

    /// Execute and return a forward-only cursor over the result set.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn execute_reader(&mut self) -> Result<Box<dyn NativeReader>, NativeError>;

    /// Execute and return the first column of the first row, or `None` when
    /// the result set is empty.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn execute_scalar(&mut self) -> Result<Option<NativeValue>, NativeError>;
}

/// A native forward-only cursor.
pub trait NativeReader {
    /// Advance to the next row; `false` when the result set is exhausted.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn advance(&mut self) -> Result<bool, NativeError>;

    /// Number of columns in the result set.
    fn field_count(&self) -> usize;

    /// Resolve a column name to its ordinal.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn ordinal(&self, column: &str) -> Result<usize, NativeError>;

    /// Name of the column at an ordinal.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn column_name(&self, ordinal: usize) -> Result<String, NativeError>;

    /// Whether the current row's cell at an ordinal is a database null.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn is_null(&self, ordinal: usize) -> Result<bool, NativeError>;

    /// The current row's cell at an ordinal, at full native precision.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn value(&self, ordinal: usize) -> Result<NativeValue, NativeError>;

    /// The native schema descriptor for the result set, unchanged.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn schema(&self) -> Result<Vec<ColumnDescriptor>, NativeError>;

    /// Close the cursor.
    ///
    /// # Errors
    ///
    /// Fails with the native client's diagnostic, propagated unchanged.
    fn close(&mut self) -> Result<(), NativeError>;
}
