// ABOUTME: Shared test fixtures: a scripted fake native driver behind the boundary traits
// ABOUTME: Records every native call in one log so tests can assert ordering and release counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::cell::RefCell;
use std::rc::Rc;

use unidb::native::{
    ColumnDescriptor, CommandOptions, NativeCommand, NativeConnection, NativeConnector,
    NativeReader, NativeTransaction, NativeValue,
};
use unidb::{AccessFactory, NativeError, Provider};

/// Scripted behavior plus a log of every native call, shared by every fake
/// object the driver hands out.
#[derive(Default)]
pub struct FakeState {
    pub calls: Vec<String>,
    pub server_version: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<NativeValue>>,
    pub schema: Vec<ColumnDescriptor>,
    pub scalar: Option<NativeValue>,
    pub affected: u64,
    /// 1-based index of the commit call that fails, when scripted.
    pub failing_commit: Option<usize>,
    commit_calls: usize,
}

impl FakeState {
    fn log(&mut self, entry: impl Into<String>) {
        self.calls.push(entry.into());
    }

    /// How many log entries match a call name exactly.
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }
}

pub type SharedState = Rc<RefCell<FakeState>>;

/// A factory with one scripted fake connector registered for `provider`,
/// plus the shared state the test drives and inspects.
pub fn scripted(provider: Provider) -> (AccessFactory, SharedState) {
    let state: SharedState = Rc::default();
    let mut factory = AccessFactory::new();
    factory.register(provider, Box::new(FakeConnector::new(Rc::clone(&state))));
    (factory, state)
}

/// Load a single-row result set into the state.
pub fn script_row(state: &SharedState, columns: &[&str], row: Vec<NativeValue>) {
    let mut state = state.borrow_mut();
    state.columns = columns.iter().map(|c| (*c).to_owned()).collect();
    state.rows = vec![row];
}

pub struct FakeConnector {
    state: SharedState,
}

impl FakeConnector {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }
}

impl NativeConnector for FakeConnector {
    fn connect(&self, connection_string: &str) -> Result<Box<dyn NativeConnection>, NativeError> {
        self.state
            .borrow_mut()
            .log(format!("connect {connection_string}"));
        Ok(Box::new(FakeConnection {
            state: Rc::clone(&self.state),
        }))
    }
}

struct FakeConnection {
    state: SharedState,
}

impl NativeConnection for FakeConnection {
    fn server_version(&self) -> Option<String> {
        self.state.borrow().server_version.clone()
    }

    fn begin(
        &mut self,
        isolation: &'static str,
    ) -> Result<Box<dyn NativeTransaction>, NativeError> {
        self.state.borrow_mut().log(format!("begin {isolation}"));
        Ok(Box::new(FakeTransaction {
            state: Rc::clone(&self.state),
        }))
    }

    fn create_command(
        &mut self,
        options: CommandOptions,
    ) -> Result<Box<dyn NativeCommand>, NativeError> {
        self.state
            .borrow_mut()
            .log(format!("create_command bind_by_name={}", options.bind_by_name));
        Ok(Box::new(FakeCommand {
            state: Rc::clone(&self.state),
            text: String::new(),
            kind: "Text",
            timeout: 30,
        }))
    }

    fn close(&mut self) -> Result<(), NativeError> {
        self.state.borrow_mut().log("close");
        Ok(())
    }
}

struct FakeTransaction {
    state: SharedState,
}

impl NativeTransaction for FakeTransaction {
    fn commit(&mut self) -> Result<(), NativeError> {
        let mut state = self.state.borrow_mut();
        state.commit_calls += 1;
        if state.failing_commit == Some(state.commit_calls) {
            state.log("commit failed");
            return Err(NativeError::new("scripted commit failure"));
        }
        state.log("commit");
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), NativeError> {
        self.state.borrow_mut().log("rollback");
        Ok(())
    }
}

struct FakeCommand {
    state: SharedState,
    text: String,
    kind: &'static str,
    timeout: u32,
}

impl Drop for FakeCommand {
    fn drop(&mut self) {
        self.state.borrow_mut().log("command released");
    }
}

impl NativeCommand for FakeCommand {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn set_kind(&mut self, kind: &'static str) {
        self.kind = kind;
    }

    fn kind(&self) -> &str {
        self.kind
    }

    fn set_timeout(&mut self, seconds: u32) {
        self.timeout = seconds;
    }

    fn timeout(&self) -> u32 {
        self.timeout
    }

    fn execute_non_query(&mut self) -> Result<u64, NativeError> {
        let mut state = self.state.borrow_mut();
        state.log(format!("execute_non_query {}", self.text));
        Ok(state.affected)
    }

    fn execute_reader(&mut self) -> Result<Box<dyn NativeReader>, NativeError> {
        self.state.borrow_mut().log("execute_reader");
        Ok(Box::new(FakeReader {
            state: Rc::clone(&self.state),
            row: None,
        }))
    }

    fn execute_scalar(&mut self) -> Result<Option<NativeValue>, NativeError> {
        let mut state = self.state.borrow_mut();
        state.log("execute_scalar");
        Ok(state.scalar.clone())
    }
}

struct FakeReader {
    state: SharedState,
    row: Option<usize>,
}

impl Drop for FakeReader {
    fn drop(&mut self) {
        self.state.borrow_mut().log("reader released");
    }
}

impl FakeReader {
    fn cell(&self, ordinal: usize) -> Result<NativeValue, NativeError> {
        let state = self.state.borrow();
        let row = self.row.ok_or_else(|| NativeError::new("no current row"))?;
        state
            .rows
            .get(row)
            .and_then(|cells| cells.get(ordinal))
            .cloned()
            .ok_or_else(|| NativeError::new(format!("no cell at ordinal {ordinal}")))
    }
}

impl NativeReader for FakeReader {
    fn advance(&mut self) -> Result<bool, NativeError> {
        let next = self.row.map_or(0, |row| row + 1);
        if next < self.state.borrow().rows.len() {
            self.row = Some(next);
            Ok(true)
        } else {
            self.row = None;
            Ok(false)
        }
    }

    fn field_count(&self) -> usize {
        self.state.borrow().columns.len()
    }

    fn ordinal(&self, column: &str) -> Result<usize, NativeError> {
        self.state
            .borrow()
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| NativeError::new(format!("unknown column '{column}'")))
    }

    fn column_name(&self, ordinal: usize) -> Result<String, NativeError> {
        self.state
            .borrow()
            .columns
            .get(ordinal)
            .cloned()
            .ok_or_else(|| NativeError::new(format!("no column at ordinal {ordinal}")))
    }

    fn is_null(&self, ordinal: usize) -> Result<bool, NativeError> {
        Ok(matches!(self.cell(ordinal)?, NativeValue::Null))
    }

    fn value(&self, ordinal: usize) -> Result<NativeValue, NativeError> {
        self.cell(ordinal)
    }

    fn schema(&self) -> Result<Vec<ColumnDescriptor>, NativeError> {
        Ok(self.state.borrow().schema.clone())
    }

    fn close(&mut self) -> Result<(), NativeError> {
        self.state.borrow_mut().log("reader closed");
        Ok(())
    }
}
