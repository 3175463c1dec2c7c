//! Interfaces implemented by database drivers.
//!
//! The mapping engine never talks to a database directly. A driver provides
//! connection acquisition ([`Pool`]), statement execution ([`Connection`],
//! [`Statement`]), result traversal ([`RowCursor`]) and a metadata snapshot.

mod cursor;
pub use cursor::{BufferedCursor, ColumnRef, RowCursor};

mod pool;
pub use pool::Pool;

mod statement;
pub use statement::{BatchRowResult, Statement};

use crate::{schema::DbMetadata, stmt::Value, Result};

/// A single database session.
///
/// All calls run on the caller's thread. Placeholders are positional `?`
/// markers bound in order.
pub trait Connection: Send {
    /// Executes a statement that returns no rows and reports the affected
    /// row count.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Executes an insert and returns the affected row count together with
    /// the values the database generated for the new row, in key column
    /// order. The key list is empty when nothing was generated.
    fn execute_returning_keys(&mut self, sql: &str, params: &[Value]) -> Result<(u64, Vec<Value>)>;

    /// Runs a query. The returned cursor must be closed by the caller.
    fn query<'a>(&'a mut self, sql: &str, params: &[Value]) -> Result<Box<dyn RowCursor + 'a>>;

    /// Prepares a statement for repeated or batched execution. Batch
    /// results carry no generated keys.
    fn prepare<'a>(&'a mut self, sql: &str) -> Result<Box<dyn Statement + 'a>>;

    /// Prepares an insert whose batch results report the values the
    /// database generated for each row.
    fn prepare_returning_keys<'a>(&'a mut self, sql: &str) -> Result<Box<dyn Statement + 'a>>;

    /// Captures the current table metadata.
    fn metadata(&mut self) -> Result<DbMetadata>;
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        (**self).execute(sql, params)
    }

    fn execute_returning_keys(&mut self, sql: &str, params: &[Value]) -> Result<(u64, Vec<Value>)> {
        (**self).execute_returning_keys(sql, params)
    }

    fn query<'a>(&'a mut self, sql: &str, params: &[Value]) -> Result<Box<dyn RowCursor + 'a>> {
        (**self).query(sql, params)
    }

    fn prepare<'a>(&'a mut self, sql: &str) -> Result<Box<dyn Statement + 'a>> {
        (**self).prepare(sql)
    }

    fn prepare_returning_keys<'a>(&'a mut self, sql: &str) -> Result<Box<dyn Statement + 'a>> {
        (**self).prepare_returning_keys(sql)
    }

    fn metadata(&mut self) -> Result<DbMetadata> {
        (**self).metadata()
    }
}
