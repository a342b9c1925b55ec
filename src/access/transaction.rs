// ABOUTME: Transaction handle: one-shot commit/rollback plus explicit disposal
// ABOUTME: Ending a non-default transaction triggers the backend's isolation-reset hook
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::enforcer::HandleId;
use crate::errors::{AccessResult, ResourceKind, UsageError};
use crate::native::NativeTransaction;
use crate::types::IsolationLevel;

use super::AccessInner;

/// A live transaction on one connection.
///
/// Commit or rollback is legal exactly once; afterwards the handle is only
/// good for [`Transaction::dispose`]. Disposal is rejected while commands
/// are undisposed or before the transaction has ended, and a rejected
/// disposal leaves the handle intact for a retry.
pub struct Transaction {
    access: Rc<AccessInner>,
    native: Option<Box<dyn NativeTransaction>>,
    id: HandleId,
    level: IsolationLevel,
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

impl Transaction {
    pub(super) fn new(
        access: Rc<AccessInner>,
        native: Box<dyn NativeTransaction>,
        id: HandleId,
        level: IsolationLevel,
    ) -> Self {
        Self {
            access,
            native: Some(native),
            id,
            level,
        }
    }

    /// The isolation level this transaction was begun at.
    #[must_use]
    pub fn isolation(&self) -> IsolationLevel {
        self.level
    }

    // the object bound must stay 'static: an elided bound would shrink to
    // the borrow and `&mut` cannot reborrow the boxed object at it
    fn native(&mut self) -> Result<&mut (dyn NativeTransaction + 'static), UsageError> {
        self.native
            .as_deref_mut()
            .ok_or_else(|| UsageError::closed(ResourceKind::Transaction))
    }

    /// Commit the transaction.
    ///
    /// On backends where an explicit isolation level leaks into the next
    /// transaction on the same (pooled) connection, a successful non-default
    /// commit is followed by the isolation-reset hook; the reset runs through
    /// the full begin path, strictly after this transaction is marked ended.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the transaction has been disposed or has already ended
    /// - the native commit fails
    /// - the follow-up isolation reset is rejected or fails (the
    ///   transaction is already marked ended by then)
    pub fn commit(&mut self) -> AccessResult<()> {
        self.access
            .enforcer
            .borrow()
            .verify_can_end_transaction(self.id)?;
        self.native()?.commit()?;
        self.access.enforcer.borrow_mut().end_transaction(self.id)?;
        debug!(id = %self.id, "transaction committed");
        if self.access.profile.resets_isolation_on_end && self.level != IsolationLevel::Default {
            self.access.reset_isolation()?;
        }
        Ok(())
    }

    /// Roll the transaction back.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction has been disposed or has already
    /// ended, or if the native rollback fails.
    pub fn rollback(&mut self) -> AccessResult<()> {
        self.access
            .enforcer
            .borrow()
            .verify_can_end_transaction(self.id)?;
        self.native()?.rollback()?;
        self.access.enforcer.borrow_mut().end_transaction(self.id)?;
        debug!(id = %self.id, "transaction rolled back");
        Ok(())
    }

    /// Dispose the transaction.
    ///
    /// Legal only after commit or rollback and with no undisposed commands
    /// on the connection; nothing is released on rejection.
    ///
    /// # Errors
    ///
    /// Returns an error if commands are undisposed, the transaction has not
    /// ended, or it already left the registry.
    pub fn dispose(&mut self) -> AccessResult<()> {
        self.access
            .enforcer
            .borrow_mut()
            .verify_transaction_disposable(self.id)?;
        self.access
            .enforcer
            .borrow_mut()
            .dispose_transaction(self.id)?;
        self.native = None;
        Ok(())
    }
}
