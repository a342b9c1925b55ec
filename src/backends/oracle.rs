// ABOUTME: Oracle backend profile
// ABOUTME: Emulated boolean, named parameter binding, read-committed/serializable only
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{AccessError, AccessResult};
use crate::types::{CommandKind, IsolationLevel, Provider};

use super::BackendProfile;

pub(crate) static PROFILE: BackendProfile = BackendProfile {
    provider: Provider::Oracle,
    emulates_boolean: true,
    resets_isolation_on_end: false,
    bind_by_name: true,
    fractional_seconds,
    isolation_token,
    kind_token,
    kind_from_token,
};

// TIMESTAMP carries up to 9 digits on every supported Oracle release.
fn fractional_seconds(_server_version: Option<&str>) -> u8 {
    9
}

fn isolation_token(level: IsolationLevel) -> AccessResult<&'static str> {
    match level {
        IsolationLevel::Default | IsolationLevel::ReadCommitted => Ok("READ COMMITTED"),
        IsolationLevel::Serializable => Ok("SERIALIZABLE"),
        unsupported => Err(AccessError::UnsupportedIsolation {
            provider: Provider::Oracle,
            level: unsupported,
        }),
    }
}

fn kind_token(kind: CommandKind) -> &'static str {
    match kind {
        CommandKind::Text => "Text",
        CommandKind::StoredProcedure => "StoredProcedure",
    }
}

fn kind_from_token(token: &str) -> CommandKind {
    if token == "StoredProcedure" {
        CommandKind::StoredProcedure
    } else {
        CommandKind::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_two_isolation_levels_map() {
        assert_eq!(
            isolation_token(IsolationLevel::Default).ok(),
            Some("READ COMMITTED")
        );
        assert_eq!(
            isolation_token(IsolationLevel::Serializable).ok(),
            Some("SERIALIZABLE")
        );
        for level in [
            IsolationLevel::ReadUncommitted,
            IsolationLevel::RepeatableRead,
            IsolationLevel::Snapshot,
        ] {
            assert!(matches!(
                isolation_token(level),
                Err(AccessError::UnsupportedIsolation {
                    provider: Provider::Oracle,
                    ..
                })
            ));
        }
    }

    #[test]
    fn fractional_seconds_ignore_the_version() {
        assert_eq!(fractional_seconds(None), 9);
        assert_eq!(fractional_seconds(Some("19.3.0.0.0")), 9);
    }
}
