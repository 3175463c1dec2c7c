use crate::ExecLog;

use rowbound_core::{
    driver::{BatchRowResult, Connection, Pool, RowCursor, Statement},
    schema::DbMetadata,
    stmt::Value,
    Result,
};

use std::sync::{Arc, Mutex};

/// What kind of driver call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Execute,
    ExecuteReturningKeys,
    Query,
    Prepare,

    /// One execution of a prepared statement
    StatementExecute,

    /// A native batch flush with this many queued parameter sets
    Batch(usize),

    Metadata,
}

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecOp {
    pub kind: OpKind,
    pub sql: String,
    pub params: Vec<Value>,
}

type Ops = Arc<Mutex<Vec<ExecOp>>>;

/// A pool wrapper that records every operation of the connections it hands
/// out.
pub struct LoggingPool {
    inner: Box<dyn Pool>,

    /// Log of all operations executed through this pool
    ops_log: Ops,
}

impl LoggingPool {
    pub fn new(pool: impl Pool) -> Self {
        Self {
            inner: Box::new(pool),
            ops_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a handle to access the operations log
    pub fn exec_log(&self) -> ExecLog {
        ExecLog::new(self.ops_log.clone())
    }
}

impl Pool for LoggingPool {
    fn acquire(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(LoggingConnection {
            inner: self.inner.acquire()?,
            ops_log: self.ops_log.clone(),
        }))
    }
}

/// A connection wrapper that logs all operations for testing purposes
pub struct LoggingConnection {
    /// The underlying connection that actually executes operations
    inner: Box<dyn Connection>,

    ops_log: Ops,
}

fn record(ops: &Ops, kind: OpKind, sql: &str, params: &[Value]) {
    ops.lock()
        .expect("Failed to acquire ops log lock")
        .push(ExecOp {
            kind,
            sql: sql.to_string(),
            params: params.to_vec(),
        });
}

impl Connection for LoggingConnection {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        record(&self.ops_log, OpKind::Execute, sql, params);
        self.inner.execute(sql, params)
    }

    fn execute_returning_keys(&mut self, sql: &str, params: &[Value]) -> Result<(u64, Vec<Value>)> {
        record(&self.ops_log, OpKind::ExecuteReturningKeys, sql, params);
        self.inner.execute_returning_keys(sql, params)
    }

    fn query<'a>(&'a mut self, sql: &str, params: &[Value]) -> Result<Box<dyn RowCursor + 'a>> {
        record(&self.ops_log, OpKind::Query, sql, params);
        self.inner.query(sql, params)
    }

    fn prepare<'a>(&'a mut self, sql: &str) -> Result<Box<dyn Statement + 'a>> {
        record(&self.ops_log, OpKind::Prepare, sql, &[]);
        Ok(Box::new(LoggingStatement {
            inner: self.inner.prepare(sql)?,
            ops_log: self.ops_log.clone(),
            queued: vec![],
        }))
    }

    fn prepare_returning_keys<'a>(&'a mut self, sql: &str) -> Result<Box<dyn Statement + 'a>> {
        record(&self.ops_log, OpKind::Prepare, sql, &[]);
        Ok(Box::new(LoggingStatement {
            inner: self.inner.prepare_returning_keys(sql)?,
            ops_log: self.ops_log.clone(),
            queued: vec![],
        }))
    }

    fn metadata(&mut self) -> Result<DbMetadata> {
        record(&self.ops_log, OpKind::Metadata, "", &[]);
        self.inner.metadata()
    }
}

struct LoggingStatement<'a> {
    inner: Box<dyn Statement + 'a>,
    ops_log: Ops,

    /// Parameter sets queued since the last flush
    queued: Vec<Vec<Value>>,
}

impl Statement for LoggingStatement<'_> {
    fn sql(&self) -> &str {
        self.inner.sql()
    }

    fn execute(&mut self, params: &[Value]) -> Result<u64> {
        record(&self.ops_log, OpKind::StatementExecute, self.inner.sql(), params);
        self.inner.execute(params)
    }

    fn add_batch(&mut self, params: Vec<Value>) -> Result<()> {
        self.queued.push(params.clone());
        self.inner.add_batch(params)
    }

    fn execute_batch(&mut self) -> Result<Vec<BatchRowResult>> {
        let queued = std::mem::take(&mut self.queued);
        let params: Vec<Value> = queued.iter().flatten().cloned().collect();
        record(&self.ops_log, OpKind::Batch(queued.len()), self.inner.sql(), &params);
        self.inner.execute_batch()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}
