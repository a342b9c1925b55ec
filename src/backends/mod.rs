// ABOUTME: Per-backend capability profiles behind one shared shape
// ABOUTME: Fractional-seconds support, boolean emulation, isolation-reset hook, token mappings
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Backend Profiles
//!
//! Everything that differs between SQL Server, Oracle and MySQL above the
//! native boundary is captured in one [`BackendProfile`] per backend. The
//! wrappers consult the profile; they never branch on the provider
//! themselves. Behavioral differences (like resetting the isolation level
//! after a non-default transaction ends) are flags here, not universal
//! behavior.

use crate::errors::AccessResult;
use crate::types::{CommandKind, IsolationLevel, Provider};

pub(crate) mod mysql;
pub(crate) mod oracle;
pub(crate) mod sqlserver;

/// Capability record for one backend.
pub(crate) struct BackendProfile {
    /// Which backend this profile describes.
    pub provider: Provider,
    /// True when the backend has no native boolean type and true is the
    /// numeric literal 1.
    pub emulates_boolean: bool,
    /// True when ending a non-default-isolation transaction must reset the
    /// connection-level isolation setting back to the default (otherwise it
    /// leaks into the next implicit transaction on a pooled connection).
    pub resets_isolation_on_end: bool,
    /// True when native commands must bind parameters by name.
    pub bind_by_name: bool,
    /// Maximum digits of fractional seconds the backend's date-time types
    /// support, derived from the native server version string.
    pub fractional_seconds: fn(Option<&str>) -> u8,
    /// 1:1 mapping from the caller-facing isolation set onto the backend's
    /// native isolation token. Fails for levels the backend does not have.
    pub isolation_token: fn(IsolationLevel) -> AccessResult<&'static str>,
    /// 1:1 mapping from the caller-facing command kind onto the backend's
    /// native command-type token.
    pub kind_token: fn(CommandKind) -> &'static str,
    /// Reverse of `kind_token`; unknown tokens read back as plain text.
    pub kind_from_token: fn(&str) -> CommandKind,
}

impl BackendProfile {
    /// The static profile for a provider.
    pub(crate) fn for_provider(provider: Provider) -> &'static Self {
        match provider {
            Provider::SqlServer => &sqlserver::PROFILE,
            Provider::Oracle => &oracle::PROFILE,
            Provider::MySql => &mysql::PROFILE,
        }
    }
}

/// Split a native server version string into numeric pieces, tolerating
/// suffixes like `5.6.4-log` or `10.50.1600.1 (X64)`.
pub(crate) fn version_pieces(version: &str) -> Vec<u32> {
    version
        .split('.')
        .map(|piece| {
            let digits: String = piece.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_pieces_tolerate_suffixes() {
        assert_eq!(version_pieces("5.6.4-log"), vec![5, 6, 4]);
        assert_eq!(version_pieces("10.50.1600.1 (X64)"), vec![10, 50, 1600, 1]);
        assert_eq!(version_pieces("garbage"), vec![0]);
    }
}
