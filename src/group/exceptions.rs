//! Per-member failures collected during one-way calls.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::interfaces::{InvocationError, MemberRef};

use super::error::GroupError;

/// One member's failure.
#[derive(Debug, Clone)]
pub struct ExceptionRecord {
    /// The member that failed.
    pub member: MemberRef,
    /// Its position in the group when the call was dispatched.
    pub index: usize,
    pub failure: InvocationError,
}

/// Ordered, append-only collection of member failures.
///
/// Records appear in completion order, not member order. Clones share the
/// same underlying list.
#[derive(Clone, Default)]
pub struct ExceptionList {
    records: Arc<Mutex<Vec<ExceptionRecord>>>,
}

impl ExceptionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, record: ExceptionRecord) {
        self.records.lock().push(record);
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Snapshot of the records collected so far.
    pub fn records(&self) -> Vec<ExceptionRecord> {
        self.records.lock().clone()
    }

    /// Iterate over a snapshot of the records.
    pub fn iter(&self) -> std::vec::IntoIter<ExceptionRecord> {
        self.records().into_iter()
    }

    /// Indices of the failed members, in completion order.
    pub fn indices(&self) -> Vec<usize> {
        self.records.lock().iter().map(|r| r.index).collect()
    }

    /// Turn a non-empty list into an error.
    pub fn ensure_empty(&self) -> Result<(), GroupError> {
        match self.len() {
            0 => Ok(()),
            count => Err(GroupError::MemberFailures { count }),
        }
    }
}

impl fmt::Debug for ExceptionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.records.lock().iter()).finish()
    }
}

impl IntoIterator for &ExceptionList {
    type Item = ExceptionRecord;
    type IntoIter = std::vec::IntoIter<ExceptionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
