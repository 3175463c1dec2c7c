use crate::{generated_keys, Param};

use rowbound_core::{
    driver::{BatchRowResult, Statement},
    stmt::Value,
    Error, Result,
};
use rusqlite::Connection;

/// A prepared statement. SQLite has no native batch, so queued parameter
/// sets run one after another on the same prepared statement.
pub(crate) struct SqliteStatement<'a> {
    connection: &'a Connection,
    stmt: Option<rusqlite::Statement<'a>>,
    sql: String,
    queue: Vec<Vec<Value>>,

    /// Report `last_insert_rowid` for each queued set
    returning_keys: bool,
}

impl<'a> SqliteStatement<'a> {
    pub(crate) fn new(connection: &'a Connection, sql: &str) -> Result<SqliteStatement<'a>> {
        let stmt = connection.prepare(sql).map_err(Error::driver)?;

        Ok(SqliteStatement {
            connection,
            stmt: Some(stmt),
            sql: sql.to_string(),
            queue: vec![],
            returning_keys: false,
        })
    }

    pub(crate) fn returning_keys(mut self) -> Self {
        self.returning_keys = true;
        self
    }

    fn stmt(&mut self) -> Result<&mut rusqlite::Statement<'a>> {
        self.stmt
            .as_mut()
            .ok_or_else(|| Error::invalid_argument("statement is closed"))
    }
}

impl Statement for SqliteStatement<'_> {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn execute(&mut self, params: &[Value]) -> Result<u64> {
        let count = self
            .stmt()?
            .execute(rusqlite::params_from_iter(Param::all(params)))
            .map_err(Error::driver)?;
        Ok(count as u64)
    }

    fn add_batch(&mut self, params: Vec<Value>) -> Result<()> {
        self.stmt()?;
        self.queue.push(params);
        Ok(())
    }

    fn execute_batch(&mut self) -> Result<Vec<BatchRowResult>> {
        let queue = std::mem::take(&mut self.queue);
        let mut results = Vec::with_capacity(queue.len());

        for params in &queue {
            let rows_affected = self.execute(params)?;
            let generated_keys = if self.returning_keys {
                generated_keys(self.connection, rows_affected)
            } else {
                vec![]
            };

            results.push(BatchRowResult {
                rows_affected,
                generated_keys,
            });
        }

        Ok(results)
    }

    fn close(&mut self) -> Result<()> {
        self.queue.clear();
        match self.stmt.take() {
            Some(stmt) => stmt.finalize().map_err(Error::driver),
            None => Ok(()),
        }
    }
}
