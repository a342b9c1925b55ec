// ABOUTME: Connection facade and the shared per-connection state
// ABOUTME: Every operation runs enforcer pre-check, then native delegate, then registry update
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Resource Wrappers
//!
//! [`Access`] is one open connection; [`Transaction`], [`Command`] and
//! [`Reader`] are its children. All four share one [`AccessInner`] through an
//! `Rc`, which carries the usage enforcer, the native connection and the
//! backend profile. The handles are therefore `!Send`: one logical thread
//! drives one connection's resource tree.
//!
//! Every public operation follows the same order: enforcer pre-check, native
//! delegate, registry update. Disposal is an explicit fallible method rather
//! than `Drop`, and the lifecycle check runs before any native resource is
//! released, so a rejected disposal releases nothing and can be retried once
//! the children are gone.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::backends::BackendProfile;
use crate::enforcer::{HandleId, UsageEnforcer};
use crate::errors::AccessResult;
use crate::native::{CommandOptions, NativeConnection, NativeConnector, NativeTransaction};
use crate::types::{IsolationLevel, Provider};

mod command;
mod reader;
mod transaction;

pub use command::Command;
pub use reader::Reader;
pub use transaction::Transaction;

/// State shared by a connection and all of its child handles.
pub(crate) struct AccessInner {
    pub(crate) enforcer: RefCell<UsageEnforcer>,
    pub(crate) connection: RefCell<Box<dyn NativeConnection>>,
    pub(crate) profile: &'static BackendProfile,
    connection_string: String,
    fractional_seconds: u8,
}

impl AccessInner {
    /// Begin a native transaction through the full pre-check path and
    /// register it. Shared by the public begin and the isolation-reset hook.
    fn begin_entry(
        &self,
        level: IsolationLevel,
    ) -> AccessResult<(HandleId, Box<dyn NativeTransaction>)> {
        self.enforcer.borrow_mut().verify_can_begin_transaction()?;
        let token = (self.profile.isolation_token)(level)?;
        let native = self.connection.borrow_mut().begin(token)?;
        let id = self.enforcer.borrow_mut().record_transaction();
        Ok((id, native))
    }

    /// Put the connection-level isolation setting back to the backend
    /// default by running an empty default-isolation transaction. Runs the
    /// full begin path, so open commands reject it like any other begin.
    pub(crate) fn reset_isolation(&self) -> AccessResult<()> {
        let (id, mut native) = self.begin_entry(IsolationLevel::Default)?;
        // no handle for this entry ever escapes, so it must leave the
        // registry even when the native commit fails; a pending entry with
        // no owner would reject every later begin
        let committed = native.commit();
        self.enforcer.borrow_mut().end_transaction(id)?;
        self.enforcer.borrow_mut().verify_transaction_disposable(id)?;
        self.enforcer.borrow_mut().dispose_transaction(id)?;
        committed?;
        debug!("isolation level reset to backend default");
        Ok(())
    }
}

/// An open connection to one backend.
///
/// Obtained from [`AccessFactory::open`](crate::factory::AccessFactory::open).
/// Closing is explicit: [`Access::close`] fails while transactions or
/// commands are still undisposed and leaves the connection open.
pub struct Access {
    inner: Rc<AccessInner>,
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Access")
            .field("provider", &self.inner.profile.provider)
            .field("fractional_seconds", &self.inner.fractional_seconds)
            .finish_non_exhaustive()
    }
}

impl Access {
    pub(crate) fn open(
        profile: &'static BackendProfile,
        connector: &dyn NativeConnector,
        connection_string: &str,
    ) -> AccessResult<Self> {
        let connection = connector.connect(connection_string)?;
        let version = connection.server_version();
        let fractional_seconds = (profile.fractional_seconds)(version.as_deref());
        debug!(
            provider = profile.provider.name(),
            server_version = version.as_deref().unwrap_or("unknown"),
            fractional_seconds,
            "connection opened"
        );
        Ok(Self {
            inner: Rc::new(AccessInner {
                enforcer: RefCell::new(UsageEnforcer::register_access()),
                connection: RefCell::new(connection),
                profile,
                connection_string: connection_string.to_owned(),
                fractional_seconds,
            }),
        })
    }

    /// The connection string this connection was opened with, verbatim.
    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.inner.connection_string
    }

    /// The backend this connection talks to.
    #[must_use]
    pub fn provider(&self) -> Provider {
        self.inner.profile.provider
    }

    /// Digits of fractional seconds the backend's date-time types carry,
    /// derived from the native server version at open time. Zero means
    /// date-time values round to whole seconds server-side.
    #[must_use]
    pub fn fractional_seconds_supported(&self) -> u8 {
        self.inner.fractional_seconds
    }

    /// Begin a transaction at the backend's default isolation level.
    ///
    /// # Errors
    ///
    /// See [`Access::begin_transaction_with`].
    pub fn begin_transaction(&self) -> AccessResult<Transaction> {
        self.begin_transaction_with(IsolationLevel::Default)
    }

    /// Begin a transaction at an explicit isolation level.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the connection has been closed
    /// - a command is undisposed or another transaction is pending
    /// - the backend has no native mapping for `level`
    /// - the native begin fails
    pub fn begin_transaction_with(&self, level: IsolationLevel) -> AccessResult<Transaction> {
        let (id, native) = self.inner.begin_entry(level)?;
        Ok(Transaction::new(Rc::clone(&self.inner), native, id, level))
    }

    /// Create a command. The command runs inside the connection's active
    /// transaction, if one is open.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection has been closed or the native
    /// command cannot be created.
    pub fn create_command(&self) -> AccessResult<Command> {
        self.inner.enforcer.borrow().verify_access_open()?;
        let options = CommandOptions {
            bind_by_name: self.inner.profile.bind_by_name,
        };
        let native = self.inner.connection.borrow_mut().create_command(options)?;
        let id = self.inner.enforcer.borrow_mut().record_command();
        Ok(Command::new(Rc::clone(&self.inner), native, id))
    }

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Fails while transactions or commands are undisposed; the failure
    /// chains the connection's most recent usage violation as its cause, and
    /// the native connection stays open for a retry. Also fails once already
    /// closed, and on a native close failure.
    pub fn close(&mut self) -> AccessResult<()> {
        self.inner.enforcer.borrow().verify_access_open()?;
        self.inner.enforcer.borrow_mut().verify_access_disposable()?;
        self.inner.connection.borrow_mut().close()?;
        self.inner.enforcer.borrow_mut().dispose_access();
        Ok(())
    }
}
