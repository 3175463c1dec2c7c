use crate::{ExecOp, OpKind};

use std::sync::{Arc, Mutex};

/// A wrapper around the operations log that provides a clean API for tests
#[derive(Clone)]
pub struct ExecLog {
    ops: Arc<Mutex<Vec<ExecOp>>>,
}

impl ExecLog {
    pub(crate) fn new(ops: Arc<Mutex<Vec<ExecOp>>>) -> Self {
        Self { ops }
    }

    /// Get the number of logged operations
    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// Count operations of the given kind
    pub fn count(&self, kind: OpKind) -> usize {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| op.kind == kind)
            .count()
    }

    /// Operations that ran SQL against the database, leaving out statement
    /// preparation and metadata reads
    pub fn executed(&self) -> Vec<ExecOp> {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| !matches!(op.kind, OpKind::Prepare | OpKind::Metadata))
            .cloned()
            .collect()
    }

    /// Clear the log
    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// Remove and return the first operation from the log
    pub fn pop(&self) -> Option<ExecOp> {
        let mut ops = self.ops.lock().unwrap();
        if ops.is_empty() {
            None
        } else {
            Some(ops.remove(0))
        }
    }
}
