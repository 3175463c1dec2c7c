use super::Error;
use std::ops::Range;

/// Context attached to a batch write failure.
///
/// Chunks that completed before the failure are not rolled back; `range`
/// names the input positions of the chunk that failed.
#[derive(Debug)]
pub(super) struct ChunkFailedError {
    op: &'static str,
    range: Range<usize>,
}

impl std::error::Error for ChunkFailedError {}

impl core::fmt::Display for ChunkFailedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} failed for input rows {}..{}",
            self.op, self.range.start, self.range.end
        )
    }
}

impl Error {
    /// Creates chunk failure context, usually passed to [`Error::context`].
    pub fn chunk_failed(op: &'static str, range: Range<usize>) -> Error {
        Error::from(super::ErrorKind::ChunkFailed(ChunkFailedError { op, range }))
    }

    /// Returns the input index range of the failed chunk, if any.
    pub fn failed_chunk(&self) -> Option<Range<usize>> {
        self.chain().find_map(|err| match err.kind() {
            super::ErrorKind::ChunkFailed(err) => Some(err.range.clone()),
            _ => None,
        })
    }
}
