use crate::config::MultiRowStrategy;

use rowbound_core::stmt::Value;

use std::ops::Range;

/// The result of writing one input object.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    /// Position in the input
    pub index: usize,

    /// Rows affected by this object's statement. Unknown when the object
    /// was written as part of a multi-row statement.
    pub rows_affected: Option<u64>,

    /// Values generated by the database, in key column order
    pub generated_keys: Vec<Value>,
}

/// The result of one executed chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkOutcome {
    /// Input positions covered by the chunk
    pub range: Range<usize>,

    pub strategy: MultiRowStrategy,

    /// Total rows affected by the chunk
    pub rows_affected: u64,
}

/// Outcomes of a multi-object write, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteResult {
    pub rows: Vec<RowOutcome>,
    pub chunks: Vec<ChunkOutcome>,
}

impl WriteResult {
    /// Total rows affected across all chunks.
    pub fn rows_affected(&self) -> u64 {
        self.chunks.iter().map(|chunk| chunk.rows_affected).sum()
    }

    /// Number of objects written.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn push_chunk(
        &mut self,
        range: Range<usize>,
        strategy: MultiRowStrategy,
        rows_affected: u64,
    ) {
        self.chunks.push(ChunkOutcome {
            range,
            strategy,
            rows_affected,
        });
    }
}
