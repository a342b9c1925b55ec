// ABOUTME: Unified error surface for the database-access layer
// ABOUTME: Usage-order violations, codec conversion failures, and native client pass-through
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Error Handling
//!
//! Three layers of failure are kept distinct and never reinterpreted:
//!
//! - [`UsageError`]: a lifecycle transition was rejected by the usage
//!   enforcer. These are cloneable so the most recent violation can sit in
//!   the per-connection last-fault slot and later surface as a chained cause.
//! - Codec failures ([`AccessError::ConversionRange`],
//!   [`AccessError::ConversionOverflow`], [`AccessError::UnexpectedType`]):
//!   a native cell value cannot be represented in the requested fixed-width
//!   type. Callers should fall back to the string-returning accessor.
//! - [`NativeError`]: the underlying client library failed. Propagated
//!   unchanged; this layer never masks backend failures.

use crate::types::{IsolationLevel, Provider};

/// Result alias used across the crate's public surface.
pub type AccessResult<T> = Result<T, AccessError>;

/// The kind of tracked resource an operation was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// An open connection handle.
    Access,
    /// A transaction handle.
    Transaction,
    /// A command handle.
    Command,
    /// A forward-only cursor handle.
    Reader,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Access => "connection",
            Self::Transaction => "transaction",
            Self::Command => "command",
            Self::Reader => "reader",
        };
        f.write_str(name)
    }
}

/// An ordering invariant rejected by the enforcer, with one fixed message per
/// invariant. The registry is left unchanged whenever one of these is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageViolation {
    /// A transaction may not begin while commands are open.
    BeginWithOpenCommands,
    /// A transaction may not begin while another live transaction is unended.
    BeginWithPendingTransaction,
    /// Commit or rollback was called on a transaction that already ended.
    TransactionAlreadyEnded,
    /// A transaction may not be disposed while commands are open.
    DisposeTransactionWithOpenCommands,
    /// A transaction may not be disposed before commit or rollback.
    DisposeTransactionNotEnded,
    /// A command may not be disposed while it owns an open reader.
    DisposeCommandWithOpenReaders,
    /// A connection may not close while it owns open children.
    CloseAccessWithOpenChildren,
}

impl UsageViolation {
    /// The fixed diagnostic message for this violation.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::BeginWithOpenCommands => {
                "cannot begin a transaction while commands are undisposed"
            }
            Self::BeginWithPendingTransaction => {
                "cannot begin a transaction while another transaction is pending"
            }
            Self::TransactionAlreadyEnded => {
                "transaction has already ended; it is no longer usable"
            }
            Self::DisposeTransactionWithOpenCommands => {
                "cannot dispose a transaction while commands are undisposed"
            }
            Self::DisposeTransactionNotEnded => {
                "cannot dispose a transaction which has not been committed or rolled back"
            }
            Self::DisposeCommandWithOpenReaders => {
                "cannot dispose a command while readers are undisposed"
            }
            Self::CloseAccessWithOpenChildren => {
                "cannot close the connection while transactions or commands are undisposed"
            }
        }
    }
}

impl std::fmt::Display for UsageViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A lifecycle transition rejected by the usage enforcer.
///
/// Cloneable by design: the enforcer records the most recent violation in the
/// connection's last-fault slot, and a later failed connection close chains it
/// as the `#[source]` cause.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UsageError {
    /// The addressed handle is absent from the registry. Raised immediately
    /// and distinctly from business-rule violations; never retried.
    #[error("{resource} has been disposed")]
    ResourceClosed {
        /// Kind of the handle the operation was addressed to.
        resource: ResourceKind,
    },

    /// An ordering invariant was violated on an otherwise-valid handle.
    #[error("{violation}")]
    InvalidState {
        /// Which invariant was violated.
        violation: UsageViolation,
        /// Most recent prior violation on the same connection, if any.
        #[source]
        cause: Option<Box<UsageError>>,
    },

    /// The registry reached an impossible configuration: zero or multiple
    /// matches where exactly one entry is required. A defect in this layer or
    /// in a caller bypassing the wrappers; fatal to the current call.
    #[error("registry inconsistency: {detail}")]
    InternalConsistency {
        /// What the registry scan found.
        detail: String,
        /// Originating failure, if the inconsistency was detected while
        /// resolving another entry.
        #[source]
        cause: Option<Box<UsageError>>,
    },
}

impl UsageError {
    pub(crate) fn closed(resource: ResourceKind) -> Self {
        Self::ResourceClosed { resource }
    }

    pub(crate) fn invalid(violation: UsageViolation) -> Self {
        Self::InvalidState {
            violation,
            cause: None,
        }
    }

    pub(crate) fn inconsistent(detail: impl Into<String>) -> Self {
        Self::InternalConsistency {
            detail: detail.into(),
            cause: None,
        }
    }
}

/// Failure raised by the underlying native client library.
///
/// Connectivity loss, SQL syntax errors, constraint violations and the like
/// cross this layer untouched; only the usage-order invariants above are added
/// on top.
#[derive(Debug, Clone, thiserror::Error)]
#[error("native client error: {message}")]
pub struct NativeError {
    /// Backend-supplied diagnostic text.
    pub message: String,
    /// Backend-specific error code, when one exists.
    pub code: Option<i32>,
}

impl NativeError {
    /// Wrap a backend diagnostic without a numeric code.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Wrap a backend diagnostic with its native error code.
    #[must_use]
    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
        }
    }
}

/// Top-level error type returned by every public operation of this crate.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Lifecycle transition rejected by the usage enforcer.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// A native date-time value lies outside the range of the fixed-resolution
    /// date-time type. Use the string-returning accessor instead.
    #[error("column '{column}': date-time out of range for the fixed type: {detail}")]
    ConversionRange {
        /// Column the value came from.
        column: String,
        /// Why the value is unrepresentable.
        detail: String,
    },

    /// A native numeric value exceeds the magnitude or scale of the fixed
    /// decimal type. Use the string-returning accessor instead.
    #[error("column '{column}': numeric value overflows the fixed decimal type: {detail}")]
    ConversionOverflow {
        /// Column the value came from.
        column: String,
        /// Why the value is unrepresentable.
        detail: String,
    },

    /// The native cell holds a type the requested getter cannot convert from.
    #[error("column '{column}': expected {expected}, found {actual}")]
    UnexpectedType {
        /// Column the value came from.
        column: String,
        /// Type family the getter requires.
        expected: &'static str,
        /// Type family the native cell actually holds.
        actual: &'static str,
    },

    /// The factory was given a provider name it does not know.
    #[error("unsupported provider: '{name}'")]
    UnsupportedProvider {
        /// The unrecognized provider name.
        name: String,
    },

    /// No native connector has been registered for the selected provider.
    #[error("no connector registered for provider {provider:?}")]
    ConnectorNotRegistered {
        /// The provider a connection was requested for.
        provider: Provider,
    },

    /// The requested isolation level has no native mapping on this backend.
    #[error("isolation level {level:?} is not supported by {provider:?}")]
    UnsupportedIsolation {
        /// Backend the mapping was requested for.
        provider: Provider,
        /// The unmappable level.
        level: IsolationLevel,
    },

    /// Pass-through failure from the native client library.
    #[error(transparent)]
    Native(#[from] NativeError),
}

impl AccessError {
    pub(crate) fn unexpected_type(
        column: &str,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::UnexpectedType {
            column: column.to_owned(),
            expected,
            actual,
        }
    }

    pub(crate) fn range(column: &str, detail: impl Into<String>) -> Self {
        Self::ConversionRange {
            column: column.to_owned(),
            detail: detail.into(),
        }
    }

    pub(crate) fn overflow(column: &str, detail: impl Into<String>) -> Self {
        Self::ConversionOverflow {
            column: column.to_owned(),
            detail: detail.into(),
        }
    }
}
