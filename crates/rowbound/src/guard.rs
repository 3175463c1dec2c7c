use rowbound_core::driver::{RowCursor, Statement};

use std::ops::{Deref, DerefMut};

/// Closes a cursor when dropped.
pub(crate) struct CursorGuard<'a> {
    cursor: Box<dyn RowCursor + 'a>,
}

/// Closes a prepared statement when dropped.
pub(crate) struct StatementGuard<'a> {
    stmt: Box<dyn Statement + 'a>,
}

impl<'a> CursorGuard<'a> {
    pub(crate) fn new(cursor: Box<dyn RowCursor + 'a>) -> CursorGuard<'a> {
        CursorGuard { cursor }
    }
}

impl<'a> StatementGuard<'a> {
    pub(crate) fn new(stmt: Box<dyn Statement + 'a>) -> StatementGuard<'a> {
        StatementGuard { stmt }
    }
}

impl<'a> Deref for CursorGuard<'a> {
    type Target = dyn RowCursor + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.cursor
    }
}

impl DerefMut for CursorGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.cursor
    }
}

impl Drop for CursorGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.cursor.close() {
            tracing::warn!(target: "rowbound::sql", %err, "failed to close cursor");
        }
    }
}

impl<'a> Deref for StatementGuard<'a> {
    type Target = dyn Statement + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.stmt
    }
}

impl DerefMut for StatementGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.stmt
    }
}

impl Drop for StatementGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.stmt.close() {
            tracing::warn!(target: "rowbound::sql", sql = self.stmt.sql(), %err, "failed to close statement");
        }
    }
}
