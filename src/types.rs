// ABOUTME: Caller-facing enumerations shared by every backend
// ABOUTME: Provider selection, transaction isolation levels, and command kinds
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small caller-facing enumerations.
//!
//! Each backend maps these 1:1 onto its native enumeration; the mapping
//! tables live in the per-backend modules under `backends/`.

use serde::{Deserialize, Serialize};

/// Supported database backends, selected by provider name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Microsoft SQL Server.
    SqlServer,
    /// Oracle Database.
    Oracle,
    /// MySQL.
    MySql,
}

impl Provider {
    /// Resolve a provider from its name. Accepts the canonical lowercase
    /// names plus a couple of common aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sqlserver" | "mssql" => Some(Self::SqlServer),
            "oracle" => Some(Self::Oracle),
            "mysql" => Some(Self::MySql),
            _ => None,
        }
    }

    /// Canonical provider name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SqlServer => "sqlserver",
            Self::Oracle => "oracle",
            Self::MySql => "mysql",
        }
    }
}

/// Requested concurrency-control strength for a transaction.
///
/// `Default` resolves to each backend's own default level; see the
/// per-backend mapping tables for what that is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    /// The backend's default isolation level.
    #[default]
    Default,
    /// Dirty reads permitted.
    ReadUncommitted,
    /// Only committed data is visible.
    ReadCommitted,
    /// Rows read keep their value for the transaction's duration.
    RepeatableRead,
    /// Full serializable isolation.
    Serializable,
    /// Statement-level snapshot isolation (SQL Server only).
    Snapshot,
}

/// How a command's text is interpreted by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Plain SQL text.
    #[default]
    Text,
    /// Name of a stored procedure.
    StoredProcedure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        for provider in [Provider::SqlServer, Provider::Oracle, Provider::MySql] {
            assert_eq!(Provider::from_name(provider.name()), Some(provider));
        }
    }

    #[test]
    fn provider_aliases_resolve() {
        assert_eq!(Provider::from_name("mssql"), Some(Provider::SqlServer));
        assert_eq!(Provider::from_name("MySQL"), Some(Provider::MySql));
        assert_eq!(Provider::from_name("sqlite"), None);
    }
}
