use super::{RowOutcome, WriteOp, WriteResult};
use crate::{
    config::{LogCategory, MultiRowStrategy},
    guard::StatementGuard,
    log,
    mapping::TableBinding,
    Context,
};

use rowbound_core::{
    driver::{BatchRowResult, Connection},
    err,
    stmt::Value,
    Error, Result,
};

use std::{ops::Range, sync::Arc};

/// Writes many objects of one type through a table binding.
pub(crate) struct BatchProcessor<'a, T> {
    cx: &'a Context,
    binding: &'a TableBinding<T>,
    op: WriteOp,

    /// Generated keys are needed for every row
    generated_keys: bool,
}

impl<'a, T> BatchProcessor<'a, T> {
    pub(crate) fn new(cx: &'a Context, binding: &'a TableBinding<T>, op: WriteOp) -> Self {
        BatchProcessor {
            cx,
            binding,
            op,
            generated_keys: false,
        }
    }

    /// Reports generated keys per row for inserts into tables with
    /// auto-generated columns. Forces the native batch path, the only one
    /// that returns them.
    pub(crate) fn with_generated_keys(mut self) -> Self {
        self.generated_keys = self.op == WriteOp::Insert
            && self.binding.auto_generated_columns().next().is_some();
        self
    }

    /// Writes `objects` in input order.
    ///
    /// Every element is checked before anything executes. Chunks that
    /// completed before a failing one stay written; the error names the
    /// failing chunk's input range.
    pub(crate) fn write(
        &self,
        conn: &mut dyn Connection,
        objects: &[Option<&T>],
    ) -> Result<WriteResult> {
        let objects = objects
            .iter()
            .enumerate()
            .map(|(index, obj)| {
                obj.ok_or_else(|| Error::invalid_argument_at(index, "element is missing"))
            })
            .collect::<Result<Vec<&T>>>()?;

        if objects.is_empty() {
            return Ok(WriteResult::default());
        }

        match self.strategy() {
            MultiRowStrategy::MultiRow => self.multi_row(conn, &objects),
            MultiRowStrategy::SimpleBatch => self.simple_batch(conn, &objects),
            MultiRowStrategy::MultiRowAndBatch => self.multi_row_and_batch(conn, &objects),
        }
    }

    fn strategy(&self) -> MultiRowStrategy {
        if !self.op.supports_multi_row() || self.generated_keys {
            MultiRowStrategy::SimpleBatch
        } else {
            self.cx.config().multi_row_strategy
        }
    }

    fn simple_batch(&self, conn: &mut dyn Connection, objects: &[&T]) -> Result<WriteResult> {
        let size = self.cx.config().batch_size;
        let sql = self.single_row_sql()?;
        let mut stmt = self.prepare(conn, sql, 0..size.min(objects.len()))?;
        let mut result = WriteResult::default();

        for (n, chunk) in objects.chunks(size).enumerate() {
            let range = n * size..n * size + chunk.len();
            let log = self
                .cx
                .logger()
                .start(LogCategory::MultiRow, sql, chunk.len());

            let rows = self
                .queue_rows(&mut stmt, chunk)
                .map_err(|err| self.chunk_failed(err, &range))?;

            let affected = rows.iter().map(|row| row.rows_affected).sum();
            log::finish(log, affected);

            result
                .rows
                .extend(rows.into_iter().enumerate().map(|(offset, row)| RowOutcome {
                    index: range.start + offset,
                    rows_affected: Some(row.rows_affected),
                    generated_keys: row.generated_keys,
                }));
            result.push_chunk(range, MultiRowStrategy::SimpleBatch, affected);
        }

        Ok(result)
    }

    fn multi_row(&self, conn: &mut dyn Connection, objects: &[&T]) -> Result<WriteResult> {
        let size = self.cx.config().multi_row_size;
        let (full, rest) = objects.split_at(objects.len() - objects.len() % size);
        let mut result = WriteResult::default();

        if !full.is_empty() {
            let sql = self.multi_row_sql(size)?;
            let mut stmt = self.prepare(conn, &sql, 0..size)?;

            for (n, chunk) in full.chunks(size).enumerate() {
                self.execute_chunk(
                    &mut stmt,
                    &sql,
                    n * size,
                    chunk,
                    MultiRowStrategy::MultiRow,
                    &mut result,
                )?;
            }
        }

        self.execute_rest(conn, full.len(), rest, MultiRowStrategy::MultiRow, &mut result)?;
        Ok(result)
    }

    fn multi_row_and_batch(
        &self,
        conn: &mut dyn Connection,
        objects: &[&T],
    ) -> Result<WriteResult> {
        let size = self.cx.config().multi_row_size;
        let group_size = size * self.cx.config().batch_size_with_multi_row;
        let (full, rest) = objects.split_at(objects.len() - objects.len() % size);
        let mut result = WriteResult::default();

        if !full.is_empty() {
            let sql = self.multi_row_sql(size)?;
            let mut stmt = self.prepare(conn, &sql, 0..group_size.min(full.len()))?;

            for (n, group) in full.chunks(group_size).enumerate() {
                let start = n * group_size;
                let range = start..start + group.len();
                let log = self
                    .cx
                    .logger()
                    .start(LogCategory::MultiRow, &sql, group.len());

                let statements = self
                    .queue_statements(&mut stmt, group, size)
                    .map_err(|err| self.chunk_failed(err, &range))?;

                log::finish(log, statements.iter().map(|row| row.rows_affected).sum());

                for (i, (chunk, statement)) in group.chunks(size).zip(statements).enumerate() {
                    let chunk_start = start + i * size;
                    self.push_multi_row(
                        &mut result,
                        chunk_start..chunk_start + chunk.len(),
                        MultiRowStrategy::MultiRowAndBatch,
                        statement.rows_affected,
                    );
                }
            }
        }

        self.execute_rest(
            conn,
            full.len(),
            rest,
            MultiRowStrategy::MultiRowAndBatch,
            &mut result,
        )?;
        Ok(result)
    }

    /// Writes the trailing partial chunk with a statement sized for it.
    fn execute_rest(
        &self,
        conn: &mut dyn Connection,
        start: usize,
        rest: &[&T],
        strategy: MultiRowStrategy,
        result: &mut WriteResult,
    ) -> Result<()> {
        if rest.is_empty() {
            return Ok(());
        }

        let sql = self.multi_row_sql(rest.len())?;
        let mut stmt = self.prepare(conn, &sql, start..start + rest.len())?;
        self.execute_chunk(&mut stmt, &sql, start, rest, strategy, result)
    }

    /// Prepares `sql`, asking for generated keys when they were requested.
    /// A failure is reported against `range`, the first chunk that would
    /// have run on the statement.
    fn prepare<'c>(
        &self,
        conn: &'c mut dyn Connection,
        sql: &str,
        range: Range<usize>,
    ) -> Result<StatementGuard<'c>> {
        let stmt = if self.generated_keys {
            conn.prepare_returning_keys(sql)
        } else {
            conn.prepare(sql)
        };

        stmt.map(StatementGuard::new)
            .map_err(|err| self.chunk_failed(err, &range))
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_chunk(
        &self,
        stmt: &mut StatementGuard<'_>,
        sql: &str,
        start: usize,
        chunk: &[&T],
        strategy: MultiRowStrategy,
        result: &mut WriteResult,
    ) -> Result<()> {
        let range = start..start + chunk.len();
        let log = self
            .cx
            .logger()
            .start(LogCategory::MultiRow, sql, chunk.len());

        let affected = self
            .chunk_params(chunk)
            .and_then(|params| stmt.execute(&params))
            .map_err(|err| self.chunk_failed(err, &range))?;

        log::finish(log, affected);
        self.push_multi_row(result, range, strategy, affected);
        Ok(())
    }

    fn push_multi_row(
        &self,
        result: &mut WriteResult,
        range: Range<usize>,
        strategy: MultiRowStrategy,
        affected: u64,
    ) {
        let single = range.len() == 1;

        result.rows.extend(range.clone().map(|index| RowOutcome {
            index,
            rows_affected: single.then_some(affected),
            generated_keys: vec![],
        }));
        result.push_chunk(range, strategy, affected);
    }

    /// Queues one parameter set per object and flushes the batch.
    fn queue_rows(
        &self,
        stmt: &mut StatementGuard<'_>,
        chunk: &[&T],
    ) -> Result<Vec<BatchRowResult>> {
        for obj in chunk {
            stmt.add_batch(self.params(obj)?)?;
        }

        let rows = stmt.execute_batch()?;
        expect_results(&rows, chunk.len())?;
        Ok(rows)
    }

    /// Queues one multi-row parameter set per chunk of `size` objects and
    /// flushes the batch.
    fn queue_statements(
        &self,
        stmt: &mut StatementGuard<'_>,
        group: &[&T],
        size: usize,
    ) -> Result<Vec<BatchRowResult>> {
        let chunks = group.chunks(size).len();

        for chunk in group.chunks(size) {
            stmt.add_batch(self.chunk_params(chunk)?)?;
        }

        let statements = stmt.execute_batch()?;
        expect_results(&statements, chunks)?;
        Ok(statements)
    }

    fn params(&self, obj: &T) -> Result<Vec<Value>> {
        match self.op {
            WriteOp::Insert => self.binding.insert_values(obj),
            WriteOp::Merge => self.binding.merge_values(obj),
            WriteOp::Update => self.binding.update_values(obj),
            WriteOp::Delete => self.binding.key_values(obj),
        }
    }

    fn chunk_params(&self, chunk: &[&T]) -> Result<Vec<Value>> {
        let mut params = vec![];
        for obj in chunk {
            params.extend(self.params(obj)?);
        }
        Ok(params)
    }

    fn single_row_sql(&self) -> Result<&'a str> {
        let sql = self.binding.sql();

        let template = match self.op {
            WriteOp::Insert => Some(sql.insert()),
            WriteOp::Merge => sql.merge(),
            WriteOp::Update => sql.update(),
            WriteOp::Delete => sql.delete(),
        };

        template.ok_or_else(|| self.no_template())
    }

    fn multi_row_sql(&self, rows: usize) -> Result<Arc<str>> {
        let sql = self.binding.sql();

        let template = match self.op {
            WriteOp::Insert => Some(sql.multi_row_insert(rows)),
            WriteOp::Merge => sql.multi_row_merge(rows),
            WriteOp::Update | WriteOp::Delete => None,
        };

        template.ok_or_else(|| self.no_template())
    }

    fn no_template(&self) -> Error {
        Error::mapping(format!(
            "cannot {} rows of table `{}`: no columns to write",
            self.op,
            self.binding.table_name()
        ))
    }

    fn chunk_failed(&self, err: Error, range: &Range<usize>) -> Error {
        err.context(Error::chunk_failed(self.op.as_str(), range.clone()))
    }
}

fn expect_results(results: &[BatchRowResult], queued: usize) -> Result<()> {
    if results.len() != queued {
        return Err(err!(
            "driver returned {} batch result(s) for {queued} queued statement(s)",
            results.len()
        ));
    }
    Ok(())
}
