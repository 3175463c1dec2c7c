use super::{RowMapper, RowView};
use crate::{guard::CursorGuard, log::LogPoint};

use rowbound_core::{driver::RowCursor, Error, Result};

/// Walks a cursor forward once, numbering rows from 1.
///
/// The cursor is closed when the traverser is dropped, whichever way the
/// traversal ends.
pub(crate) struct Traverser<'a> {
    cursor: CursorGuard<'a>,
    row: usize,

    /// Finished with the row count when the traversal ends
    log: Option<LogPoint<'a>>,
}

impl<'a> Traverser<'a> {
    pub(crate) fn new(cursor: Box<dyn RowCursor + 'a>) -> Traverser<'a> {
        Traverser {
            cursor: CursorGuard::new(cursor),
            row: 0,
            log: None,
        }
    }

    pub(crate) fn with_log(mut self, log: Option<LogPoint<'a>>) -> Self {
        self.log = log;
        self
    }

    /// Moves to the next row.
    pub(crate) fn advance(&mut self) -> Result<Option<(RowView<'_>, usize)>> {
        if !self.cursor.next()? {
            return Ok(None);
        }

        self.row += 1;
        Ok(Some((RowView::new(&*self.cursor), self.row)))
    }

    /// Column labels of the result.
    pub(crate) fn column_names(&self) -> &[String] {
        self.cursor.column_names()
    }

    /// Number of rows read so far.
    pub(crate) fn rows(&self) -> usize {
        self.row
    }

    /// Applies `f` to every row.
    pub(crate) fn collect<R>(
        mut self,
        mut f: impl FnMut(&RowView<'_>, usize) -> Result<R>,
    ) -> Result<Vec<R>> {
        let mut out = vec![];

        while let Some((row, number)) = self.advance()? {
            out.push(f(&row, number)?);
        }

        Ok(out)
    }

    /// Applies `f` to the first row only.
    pub(crate) fn first<R>(
        mut self,
        f: impl FnOnce(&RowView<'_>, usize) -> Result<R>,
    ) -> Result<Option<R>> {
        match self.advance()? {
            Some((row, number)) => Ok(Some(f(&row, number)?)),
            None => Ok(None),
        }
    }

    /// Like [`Traverser::first`], failing if a second row exists.
    pub(crate) fn one<R>(
        mut self,
        what: &str,
        f: impl FnOnce(&RowView<'_>, usize) -> Result<R>,
    ) -> Result<Option<R>> {
        let value = match self.advance()? {
            Some((row, number)) => f(&row, number)?,
            None => return Ok(None),
        };

        if self.advance()?.is_some() {
            return Err(Error::too_many_records(what));
        }

        Ok(Some(value))
    }
}

impl Drop for Traverser<'_> {
    fn drop(&mut self) {
        if let Some(log) = self.log.take() {
            log.finish(self.row as u64);
        }
    }
}

/// Rows mapped on demand.
///
/// Yields one `Result` per row and stops after the first error. The
/// underlying cursor is closed when this value is dropped.
pub struct LazyRows<'a, T> {
    traverser: Traverser<'a>,
    mapper: RowMapper<'a, T>,
    done: bool,
}

impl<'a, T> LazyRows<'a, T> {
    pub(crate) fn new(traverser: Traverser<'a>, mapper: RowMapper<'a, T>) -> LazyRows<'a, T> {
        LazyRows {
            traverser,
            mapper,
            done: false,
        }
    }

    /// Number of rows read so far.
    pub fn rows_read(&self) -> usize {
        self.traverser.rows()
    }
}

impl<T> Iterator for LazyRows<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let item = match self.traverser.advance() {
            Ok(Some((row, _))) => self.mapper.load(&row),
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(err) => Err(err),
        };

        if item.is_err() {
            self.done = true;
        }

        Some(item)
    }
}

impl<T> std::fmt::Debug for LazyRows<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyRows")
            .field("rows_read", &self.rows_read())
            .field("done", &self.done)
            .finish()
    }
}
