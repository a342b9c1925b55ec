// ABOUTME: MySQL backend profile
// ABOUTME: Fractional seconds from 5.6.4 onward, isolation reset on end, repeatable-read default
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{AccessError, AccessResult};
use crate::types::{CommandKind, IsolationLevel, Provider};

use super::{version_pieces, BackendProfile};

pub(crate) static PROFILE: BackendProfile = BackendProfile {
    provider: Provider::MySql,
    emulates_boolean: false,
    resets_isolation_on_end: true,
    bind_by_name: false,
    fractional_seconds,
    isolation_token,
    kind_token,
    kind_from_token,
};

// Fractional seconds in DATETIME/TIMESTAMP arrived in 5.6.4, capped at
// microseconds.
fn fractional_seconds(server_version: Option<&str>) -> u8 {
    let Some(version) = server_version else {
        return 0;
    };
    let pieces = version_pieces(version);
    let piece = |i: usize| pieces.get(i).copied().unwrap_or(0);
    let at_least = (piece(0), piece(1), piece(2)) >= (5, 6, 4);
    if at_least {
        6
    } else {
        0
    }
}

fn isolation_token(level: IsolationLevel) -> AccessResult<&'static str> {
    match level {
        IsolationLevel::Default | IsolationLevel::RepeatableRead => Ok("REPEATABLE READ"),
        IsolationLevel::ReadUncommitted => Ok("READ UNCOMMITTED"),
        IsolationLevel::ReadCommitted => Ok("READ COMMITTED"),
        IsolationLevel::Serializable => Ok("SERIALIZABLE"),
        IsolationLevel::Snapshot => Err(AccessError::UnsupportedIsolation {
            provider: Provider::MySql,
            level: IsolationLevel::Snapshot,
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
