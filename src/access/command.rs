// ABOUTME: Command handle: text/kind/timeout configuration and the three execute shapes
// ABOUTME: Runs inside the connection's active transaction implicitly; never bound to one by hand
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::rc::Rc;

use crate::enforcer::HandleId;
use crate::errors::{AccessResult, ResourceKind, UsageError};
use crate::native::{NativeCommand, NativeValue};
use crate::types::CommandKind;

use super::{AccessInner, Reader};

/// A command on one connection.
///
/// Configuration and execution both require the command to still be tracked;
/// once disposed every operation fails with `ResourceClosed`. Disposal is
/// rejected while a reader opened by this command is undisposed, and a
/// rejected disposal releases nothing.
pub struct Command {
    access: Rc<AccessInner>,
    native: Option<Box<dyn NativeCommand>>,
    id: HandleId,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Command {
    pub(super) fn new(access: Rc<AccessInner>, native: Box<dyn NativeCommand>, id: HandleId) -> Self {
        Self {
            access,
            native: Some(native),
            id,
        }
    }

    fn verify(&self) -> Result<(), UsageError> {
        self.access.enforcer.borrow().verify_valid_command(self.id)
    }

    fn native(&self) -> Result<&dyn NativeCommand, UsageError> {
        self.native
            .as_deref()
            .ok_or_else(|| UsageError::closed(ResourceKind::Command))
    }

    // the object bound must stay 'static: an elided bound would shrink to
    // the borrow and `&mut` cannot reborrow the boxed object at it
    fn native_mut(&mut self) -> Result<&mut (dyn NativeCommand + 'static), UsageError> {
        self.native
            .as_deref_mut()
            .ok_or_else(|| UsageError::closed(ResourceKind::Command))
    }

    /// Replace the command text.
    ///
    /// # Errors
    ///
    /// Returns an error if the command has been disposed.
    pub fn set_text(&mut self, text: &str) -> AccessResult<()> {
        self.verify()?;
        self.native_mut()?.set_text(text);
        Ok(())
    }

    /// Current command text.
    ///
    /// # Errors
    ///
    /// Returns an error if the command has been disposed.
    pub fn text(&self) -> AccessResult<String> {
        self.verify()?;
        Ok(self.native()?.text().to_owned())
    }

    /// Set how the command text is interpreted.
    ///
    /// # Errors
    ///
    /// Returns an error if the command has been disposed.
    pub fn set_kind(&mut self, kind: CommandKind) -> AccessResult<()> {
        self.verify()?;
        let token = (self.access.profile.kind_token)(kind);
        self.native_mut()?.set_kind(token);
        Ok(())
    }

    /// Current command kind, read back from the backend-native token.
    ///
    /// # Errors
    ///
    /// Returns an error if the command has been disposed.
    pub fn kind(&self) -> AccessResult<CommandKind> {
        self.verify()?;
        let token = self.native()?.kind().to_owned();
        Ok((self.access.profile.kind_from_token)(&token))
    }

    /// Set the execution timeout in seconds, passed through to the native
    /// client unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the command has been disposed.
    pub fn set_timeout(&mut self, seconds: u32) -> AccessResult<()> {
        self.verify()?;
        self.native_mut()?.set_timeout(seconds);
        Ok(())
    }

    /// Current execution timeout in seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the command has been disposed.
    pub fn timeout(&self) -> AccessResult<u32> {
        self.verify()?;
        Ok(self.native()?.timeout())
    }

    /// Execute and return the affected row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the command has been disposed or the native
    /// execution fails.
    pub fn execute_non_query(&mut self) -> AccessResult<u64> {
        self.verify()?;
        Ok(self.native_mut()?.execute_non_query()?)
    }

    /// Execute and return a forward-only cursor over the result set.
    ///
    /// # Errors
    ///
    /// Returns an error if the command has been disposed or the native
    /// execution fails.
    pub fn execute_reader(&mut self) -> AccessResult<Reader> {
        self.verify()?;
        let native = self.native_mut()?.execute_reader()?;
        let reader_id = self.access.enforcer.borrow_mut().record_reader(self.id);
        Ok(Reader::new(Rc::clone(&self.access), native, reader_id))
    }

    /// Execute and return the first column of the first row.
    ///
    /// An empty result set and a database-null cell both come back as
    /// [`NativeValue::Null`]; callers never distinguish the two.
    ///
    /// # Errors
    ///
    /// Returns an error if the command has been disposed or the native
    /// execution fails.
    pub fn execute_scalar(&mut self) -> AccessResult<NativeValue> {
        self.verify()?;
        let scalar = self.native_mut()?.execute_scalar()?;
        Ok(scalar.unwrap_or(NativeValue::Null))
    }

    /// Dispose the command.
    ///
    /// Rejected while a reader opened by this command is undisposed; the
    /// native command is released only after the check passes.
    ///
    /// # Errors
    ///
    /// Returns an error if a reader is undisposed or the command already
    /// left the registry.
    pub fn dispose(&mut self) -> AccessResult<()> {
        self.access
            .enforcer
            .borrow_mut()
            .verify_command_disposable(self.id)?;
        self.access.enforcer.borrow_mut().dispose_command(self.id)?;
        self.native = None;
        Ok(())
    }
}
