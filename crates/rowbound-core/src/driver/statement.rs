use crate::{stmt::Value, Result};

/// A prepared statement supporting native batch execution.
pub trait Statement {
    fn sql(&self) -> &str;

    /// Executes once with the given parameters.
    fn execute(&mut self, params: &[Value]) -> Result<u64>;

    /// Queues one parameter set for the next [`Statement::execute_batch`].
    fn add_batch(&mut self, params: Vec<Value>) -> Result<()>;

    /// Executes every queued parameter set, in queue order, and clears the
    /// queue. Returns one result per queued set.
    fn execute_batch(&mut self) -> Result<Vec<BatchRowResult>>;

    fn close(&mut self) -> Result<()>;
}

/// The outcome of one queued parameter set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRowResult {
    pub rows_affected: u64,

    /// Values generated by the database, empty when there are none
    pub generated_keys: Vec<Value>,
}
