// ABOUTME: SQL Server backend profile
// ABOUTME: Fractional seconds from SQL Server 2008 onward, isolation reset on end, Snapshot support
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::AccessResult;
use crate::types::{CommandKind, IsolationLevel, Provider};

use super::{version_pieces, BackendProfile};

pub(crate) static PROFILE: BackendProfile = BackendProfile {
    provider: Provider::SqlServer,
    emulates_boolean: false,
    resets_isolation_on_end: true,
    bind_by_name: false,
    fractional_seconds,
    isolation_token,
    kind_token,
    kind_from_token,
};

// datetime2 and its 7 digits of fractional seconds arrived with SQL Server
// 2008, which reports major version 10.
fn fractional_seconds(server_version: Option<&str>) -> u8 {
    let Some(version) = server_version else {
        return 0;
    };
    match version_pieces(version).first() {
        Some(major) if *major > 9 => 7,
        _ => 0,
    }
}

// every level maps natively; the fallible signature is shared with Oracle
#[allow(clippy::unnecessary_wraps)]
fn isolation_token(level: IsolationLevel) -> AccessResult<&'static str> {
    Ok(match level {
        IsolationLevel::Default | IsolationLevel::ReadCommitted => "READ COMMITTED",
        IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
        IsolationLevel::RepeatableRead => "REPEATABLE READ",
        IsolationLevel::Serializable => "SERIALIZABLE",
        IsolationLevel::Snapshot => "SNAPSHOT",
    })
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
    fn fractional_seconds_require_2008_or_later() {
        assert_eq!(fractional_seconds(Some("10.50.1600")), 7);
        assert_eq!(fractional_seconds(Some("13.0.4001")), 7);
        assert_eq!(fractional_seconds(Some("9.00.5000")), 0);
        assert_eq!(fractional_seconds(None), 0);
    }

    #[test]
    fn snapshot_maps_natively() {
        assert_eq!(
            isolation_token(IsolationLevel::Snapshot).ok(),
            Some("SNAPSHOT")
        );
    }
}
