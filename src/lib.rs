// ABOUTME: unidb: one database-access contract over SQL Server, Oracle and MySQL
// ABOUTME: Usage-lifecycle enforcement plus a canonical value codec on top of pluggable native drivers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # unidb
//!
//! A uniform database-access layer over three incompatible relational
//! client libraries. Application code sees one contract for connections,
//! transactions, commands and result cursors; the differences between
//! SQL Server, Oracle and MySQL are absorbed by per-backend capability
//! profiles and a canonical value codec.
//!
//! Two things live at the core:
//!
//! - a **usage enforcer**: a per-connection registry of live transactions,
//!   commands and readers that rejects out-of-order lifecycle transitions
//!   the native libraries would let slide until a confusing failure later.
//!   Violations carry fixed messages, and a failed connection close chains
//!   the most recent violation as its cause.
//! - a **canonical value codec**: typed cursor getters that convert native
//!   cell values with checked narrowing and explicit range errors; nothing
//!   is rounded, clamped or truncated silently. Exact-decimal and date-time
//!   getters have string companions that never fail.
//!
//! The wire protocol to each database stays outside this crate, behind the
//! traits in [`native`]; a driver integration (or a test fake) implements
//! them and registers with the [`AccessFactory`].
//!
//! ```no_run
//! use unidb::{AccessFactory, IsolationLevel, Provider};
//! # fn connector() -> Box<dyn unidb::native::NativeConnector> { unimplemented!() }
//!
//! # fn main() -> unidb::AccessResult<()> {
//! let mut factory = AccessFactory::new();
//! factory.register(Provider::MySql, connector());
//!
//! let access = factory.open("mysql", "server=db;database=app")?;
//! let mut tx = access.begin_transaction_with(IsolationLevel::Serializable)?;
//!
//! let mut command = access.create_command()?;
//! command.set_text("UPDATE accounts SET balance = balance - 10 WHERE id = 7")?;
//! command.execute_non_query()?;
//! command.dispose()?;
//!
//! tx.commit()?;
//! tx.dispose()?;
//! # Ok(())
//! # }
//! ```

pub mod access;
mod backends;
mod codec;
mod enforcer;
pub mod errors;
pub mod factory;
pub mod native;
pub mod types;

pub use access::{Access, Command, Reader, Transaction};
pub use errors::{AccessError, AccessResult, NativeError, ResourceKind, UsageError, UsageViolation};
pub use factory::AccessFactory;
pub use types::{CommandKind, IsolationLevel, Provider};
