//! Multi-object writes.
//!
//! Objects are written in fixed-size chunks. Each chunk runs as one
//! multi-row statement, as one native batch of single-row statements, or as
//! a native batch of multi-row statements, depending on
//! [`MultiRowStrategy`](crate::config::MultiRowStrategy). Outcomes are
//! always reported in input order.

mod outcome;
pub use outcome::{ChunkOutcome, RowOutcome, WriteResult};

mod processor;
pub(crate) use processor::BatchProcessor;

use crate::mapping::Intent;

/// A write applied to every object of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOp {
    Insert,
    Merge,
    Update,
    Delete,
}

impl WriteOp {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteOp::Insert => "insert",
            WriteOp::Merge => "merge",
            WriteOp::Update => "update",
            WriteOp::Delete => "delete",
        }
    }

    pub(crate) fn intent(self) -> Intent {
        match self {
            WriteOp::Insert => Intent::Insert,
            WriteOp::Merge => Intent::Merge,
            WriteOp::Update => Intent::Update,
            WriteOp::Delete => Intent::Delete,
        }
    }

    /// Only inserts and merges can be folded into multi-row statements.
    pub(crate) fn supports_multi_row(self) -> bool {
        matches!(self, WriteOp::Insert | WriteOp::Merge)
    }
}

impl std::fmt::Display for WriteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
