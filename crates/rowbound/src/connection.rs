use crate::{
    batch::{BatchProcessor, WriteOp, WriteResult},
    config::LogCategory,
    log::{self, LogPoint},
    mapping::{
        partition, Intent, LazyRows, RowMap, RowMapper, RowView, TableBinding, Traverser,
    },
    Context, Model,
};

use rowbound_core::{driver::Connection, stmt::Value, Error, Result};
use rowbound_sql::{ensure_fully_bound, IntoParameterizedSql, NamedParameterSql, ParameterizedSql};

use std::sync::Arc;

/// A connection with the mapping layer on top.
///
/// Every read and write runs synchronously on the caller's thread. Cursors
/// and prepared statements opened by a call are closed before it returns,
/// except for [`OrmConnection::stream`], whose cursor lives as long as the
/// returned iterator.
pub struct OrmConnection {
    cx: Arc<Context>,
    conn: Box<dyn Connection>,
}

impl OrmConnection {
    pub fn new(cx: Arc<Context>, conn: Box<dyn Connection>) -> OrmConnection {
        OrmConnection { cx, conn }
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.cx
    }

    /// The underlying driver connection.
    pub fn connection(&mut self) -> &mut dyn Connection {
        &mut *self.conn
    }

    pub fn into_inner(self) -> Box<dyn Connection> {
        self.conn
    }

    /// Starts named SQL using the configured placeholder syntax.
    pub fn named<'a>(&self, sql: impl Into<String>) -> NamedParameterSql<'a> {
        self.cx.named(sql)
    }

    /// Maps every row of the query to `T`.
    pub fn read_list<T: Model>(&mut self, sql: impl IntoParameterizedSql) -> Result<Vec<T>> {
        let sql = self.parse(sql)?;
        self.read_objects(&sql)
    }

    /// Maps the first row of the query, ignoring the rest.
    pub fn read_first<T: Model>(&mut self, sql: impl IntoParameterizedSql) -> Result<Option<T>> {
        let sql = self.parse(sql)?;
        let resolved = self.cx.resolve::<T>()?;

        self.with_rows(&sql, |rows, cx| {
            let mut mapper = RowMapper::new(resolved, cx.names());
            rows.first(|row, _| mapper.load(row))
        })
    }

    /// Maps the only row of the query.
    ///
    /// Returns `None` for an empty result and fails with a too-many-records
    /// error when a second row exists.
    pub fn read_one<T: Model>(&mut self, sql: impl IntoParameterizedSql) -> Result<Option<T>> {
        let sql = self.parse(sql)?;
        let resolved = self.cx.resolve::<T>()?;

        self.with_rows(&sql, |rows, cx| {
            let mut mapper = RowMapper::new(resolved, cx.names());
            rows.one(sql.sql(), |row, _| mapper.load(row))
        })
    }

    /// Reads every row of `T`'s table.
    pub fn read_all<T: Model>(&mut self) -> Result<Vec<T>> {
        let binding = self.binding::<T>(Intent::Read)?;
        let sql = ParameterizedSql::from_sql(binding.sql().select_all())?;
        self.read_objects(&sql)
    }

    /// Reads the row with the given primary key.
    ///
    /// A composite key is given as a [`Value::List`] in key column order.
    pub fn read_by_primary_key<T: Model>(&mut self, key: impl Into<Value>) -> Result<Option<T>> {
        let binding = self.binding::<T>(Intent::ReadByKey)?;

        let key = match key.into() {
            Value::List(values) => values,
            value => vec![value],
        };

        let sql = ParameterizedSql::new(
            binding.sql().select_by_key().unwrap_or_default(),
            binding.key_params(key)?,
        )?;

        self.with_rows(&sql, |rows, cx| {
            let mut mapper = RowMapper::new(binding.resolved().clone(), cx.names());
            rows.first(|row, _| mapper.load(row))
        })
    }

    /// Whether a row with `obj`'s primary key exists.
    pub fn exists<T: Model>(&mut self, obj: &T) -> Result<bool> {
        let binding = self.binding::<T>(Intent::ReadByKey)?;
        self.exists_with(&binding, obj)
    }

    /// Whether `table` holds a row with `obj`'s primary key.
    pub fn exists_in<T: Model>(&mut self, table: &str, obj: &T) -> Result<bool> {
        let binding = self.binding_on::<T>(table, Intent::ReadByKey)?;
        self.exists_with(&binding, obj)
    }

    /// Number of rows in `T`'s table.
    pub fn count<T: Model>(&mut self) -> Result<u64> {
        let binding = self.binding::<T>(Intent::Read)?;
        let sql = ParameterizedSql::from_sql(binding.sql().count())?;

        let count = self.with_rows(&sql, |rows, _| rows.first(|row, _| row.get_as::<u64>(0)))?;
        Ok(count.unwrap_or(0))
    }

    /// Reads every row as a map from canonical column name to value.
    pub fn read_map_list(&mut self, sql: impl IntoParameterizedSql) -> Result<Vec<RowMap>> {
        let sql = self.parse(sql)?;
        self.with_rows(&sql, |rows, cx| rows.collect(|row, _| row.to_map(cx.names())))
    }

    pub fn read_map_first(&mut self, sql: impl IntoParameterizedSql) -> Result<Option<RowMap>> {
        let sql = self.parse(sql)?;
        self.with_rows(&sql, |rows, cx| rows.first(|row, _| row.to_map(cx.names())))
    }

    pub fn read_map_one(&mut self, sql: impl IntoParameterizedSql) -> Result<Option<RowMap>> {
        let sql = self.parse(sql)?;
        self.with_rows(&sql, |rows, cx| {
            rows.one(sql.sql(), |row, _| row.to_map(cx.names()))
        })
    }

    /// Maps each row of a join to a pair of objects.
    ///
    /// Columns are assigned by label prefix: a column labelled `c_name`
    /// with prefixes `["c_", "o_"]` maps to member `name` of `A`. Prefixes
    /// are matched case-insensitively and must not overlap.
    pub fn read_tuple2_list<A: Model, B: Model>(
        &mut self,
        sql: impl IntoParameterizedSql,
        prefixes: [&str; 2],
    ) -> Result<Vec<(A, B)>> {
        let sql = self.parse(sql)?;
        let a = self.cx.resolve::<A>()?;
        let b = self.cx.resolve::<B>()?;

        self.with_rows(&sql, |rows, cx| {
            let [ca, cb] = split(rows.column_names(), &prefixes)?;
            let mut ma = RowMapper::with_columns(a, cx.names(), ca);
            let mut mb = RowMapper::with_columns(b, cx.names(), cb);

            rows.collect(|row, _| Ok((ma.load(row)?, mb.load(row)?)))
        })
    }

    /// Like [`OrmConnection::read_tuple2_list`] with three objects per row.
    pub fn read_tuple3_list<A: Model, B: Model, C: Model>(
        &mut self,
        sql: impl IntoParameterizedSql,
        prefixes: [&str; 3],
    ) -> Result<Vec<(A, B, C)>> {
        let sql = self.parse(sql)?;
        let a = self.cx.resolve::<A>()?;
        let b = self.cx.resolve::<B>()?;
        let c = self.cx.resolve::<C>()?;

        self.with_rows(&sql, |rows, cx| {
            let [ca, cb, cc] = split(rows.column_names(), &prefixes)?;
            let mut ma = RowMapper::with_columns(a, cx.names(), ca);
            let mut mb = RowMapper::with_columns(b, cx.names(), cb);
            let mut mc = RowMapper::with_columns(c, cx.names(), cc);

            rows.collect(|row, _| Ok((ma.load(row)?, mb.load(row)?, mc.load(row)?)))
        })
    }

    /// Applies `f` to every row, numbered from 1, collecting the results.
    pub fn read_with<R>(
        &mut self,
        sql: impl IntoParameterizedSql,
        f: impl FnMut(&RowView<'_>, usize) -> Result<R>,
    ) -> Result<Vec<R>> {
        let sql = self.parse(sql)?;
        self.with_rows(&sql, |rows, _| rows.collect(f))
    }

    /// Applies `f` to every row and returns the number of rows visited.
    pub fn traverse(
        &mut self,
        sql: impl IntoParameterizedSql,
        mut f: impl FnMut(&RowView<'_>, usize) -> Result<()>,
    ) -> Result<usize> {
        let sql = self.parse(sql)?;
        self.with_rows(&sql, |mut rows, _| {
            while let Some((row, number)) = rows.advance()? {
                f(&row, number)?;
            }
            Ok(rows.rows())
        })
    }

    /// Maps rows lazily, one per call to `next`.
    pub fn stream<T: Model>(&mut self, sql: impl IntoParameterizedSql) -> Result<LazyRows<'_, T>> {
        let sql = self.parse(sql)?;
        let cx = &*self.cx;
        let resolved = cx.resolve::<T>()?;

        let log = cx
            .logger()
            .start(LogCategory::ExecuteQuery, sql.sql(), sql.params().len())
            .map(LogPoint::into_owned);
        let cursor = self.conn.query(sql.sql(), sql.params())?;

        Ok(LazyRows::new(
            Traverser::new(cursor).with_log(log),
            RowMapper::new(resolved, cx.names()),
        ))
    }

    pub fn insert<T: Model>(&mut self, obj: &T) -> Result<u64> {
        let binding = self.binding::<T>(Intent::Insert)?;
        self.insert_with(&binding, obj)
    }

    /// Inserts `obj` into `table` instead of the table `T` maps to.
    pub fn insert_on<T: Model>(&mut self, table: &str, obj: &T) -> Result<u64> {
        let binding = self.binding_on::<T>(table, Intent::Insert)?;
        self.insert_with(&binding, obj)
    }

    /// Inserts `obj` and writes the values the database generated back
    /// into it.
    pub fn insert_and_get<T: Model>(&mut self, obj: &mut T) -> Result<u64> {
        let binding = self.binding::<T>(Intent::Insert)?;
        self.insert_and_get_with(&binding, obj)
    }

    pub fn insert_and_get_on<T: Model>(&mut self, table: &str, obj: &mut T) -> Result<u64> {
        let binding = self.binding_on::<T>(table, Intent::Insert)?;
        self.insert_and_get_with(&binding, obj)
    }

    /// Inserts `obj`, or updates the row with its primary key.
    pub fn merge<T: Model>(&mut self, obj: &T) -> Result<u64> {
        let binding = self.binding::<T>(Intent::Merge)?;
        self.merge_with(&binding, obj)
    }

    pub fn merge_on<T: Model>(&mut self, table: &str, obj: &T) -> Result<u64> {
        let binding = self.binding_on::<T>(table, Intent::Merge)?;
        self.merge_with(&binding, obj)
    }

    /// Updates the row with `obj`'s primary key.
    ///
    /// A table with only key columns has nothing to update; this returns 0
    /// without running a statement.
    pub fn update<T: Model>(&mut self, obj: &T) -> Result<u64> {
        let binding = self.binding::<T>(Intent::Update)?;
        self.update_with(&binding, obj)
    }

    pub fn update_on<T: Model>(&mut self, table: &str, obj: &T) -> Result<u64> {
        let binding = self.binding_on::<T>(table, Intent::Update)?;
        self.update_with(&binding, obj)
    }

    pub fn delete<T: Model>(&mut self, obj: &T) -> Result<u64> {
        let binding = self.binding::<T>(Intent::Delete)?;
        self.delete_with(&binding, obj)
    }

    pub fn delete_on<T: Model>(&mut self, table: &str, obj: &T) -> Result<u64> {
        let binding = self.binding_on::<T>(table, Intent::Delete)?;
        self.delete_with(&binding, obj)
    }

    /// Deletes every row of `T`'s table.
    pub fn delete_all<T: Model>(&mut self) -> Result<u64> {
        let binding = self.binding::<T>(Intent::Read)?;
        self.execute(binding.sql().delete_all(), &[])
    }

    /// Deletes every row of `table`, checking first that `T` can be bound
    /// to it.
    pub fn delete_all_on<T: Model>(&mut self, table: &str) -> Result<u64> {
        let binding = self.binding_on::<T>(table, Intent::Read)?;
        self.execute(binding.sql().delete_all(), &[])
    }

    /// Inserts one row into `table` from a map of column values.
    ///
    /// Keys are matched canonically against the table's columns; a key with
    /// no column fails the call before anything executes. Columns missing
    /// from the map are left to their database defaults.
    pub fn insert_map_into(&mut self, table: &str, row: &RowMap) -> Result<u64> {
        let metadata = self.cx.table_metadata(&mut *self.conn, table)?;
        let names = self.cx.names();

        let mut columns = vec![];
        let mut params = vec![];

        for (key, value) in row {
            let Some(column) = metadata
                .columns
                .iter()
                .find(|column| names.canonicalize(&column.name) == *key)
            else {
                return Err(Error::mapping(format!(
                    "key `{key}` has no column in table `{}`",
                    metadata.name
                )));
            };

            columns.push(column.name.as_str());
            params.push(value.clone());
        }

        if columns.is_empty() {
            return Err(Error::invalid_argument(format!(
                "no values to insert into table `{}`",
                metadata.name
            )));
        }

        let sql = format!(
            "insert into {} ({}) values ({})",
            metadata.name,
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );
        self.execute(&sql, &params)
    }

    /// Runs a statement and returns the number of affected rows.
    pub fn execute_update(&mut self, sql: impl IntoParameterizedSql) -> Result<u64> {
        let sql = self.parse(sql)?;
        self.execute(sql.sql(), sql.params())
    }

    /// Writes many objects, chunked according to the configured strategy.
    ///
    /// A `None` element fails the whole call before anything executes.
    pub fn write_many<T: Model>(
        &mut self,
        op: WriteOp,
        objects: &[Option<&T>],
    ) -> Result<WriteResult> {
        let binding = self.binding::<T>(op.intent())?;
        BatchProcessor::new(&self.cx, &binding, op).write(&mut *self.conn, objects)
    }

    /// [`OrmConnection::write_many`] against `table` instead of the table
    /// `T` maps to.
    pub fn write_many_on<T: Model>(
        &mut self,
        table: &str,
        op: WriteOp,
        objects: &[Option<&T>],
    ) -> Result<WriteResult> {
        let binding = self.binding_on::<T>(table, op.intent())?;
        BatchProcessor::new(&self.cx, &binding, op).write(&mut *self.conn, objects)
    }

    pub fn insert_many<T: Model>(&mut self, objects: &[T]) -> Result<WriteResult> {
        self.write_many(WriteOp::Insert, &present(objects))
    }

    pub fn merge_many<T: Model>(&mut self, objects: &[T]) -> Result<WriteResult> {
        self.write_many(WriteOp::Merge, &present(objects))
    }

    pub fn update_many<T: Model>(&mut self, objects: &[T]) -> Result<WriteResult> {
        self.write_many(WriteOp::Update, &present(objects))
    }

    pub fn delete_many<T: Model>(&mut self, objects: &[T]) -> Result<WriteResult> {
        self.write_many(WriteOp::Delete, &present(objects))
    }

    /// Inserts many objects through the native batch path and writes each
    /// row's generated values back into its object.
    pub fn insert_many_and_get<T: Model>(&mut self, objects: &mut [T]) -> Result<WriteResult> {
        let binding = self.binding::<T>(Intent::Insert)?;

        let result = {
            let refs: Vec<Option<&T>> = objects.iter().map(Some).collect();
            BatchProcessor::new(&self.cx, &binding, WriteOp::Insert)
                .with_generated_keys()
                .write(&mut *self.conn, &refs)?
        };

        for row in &result.rows {
            apply_generated_keys(&binding, &mut objects[row.index], row.generated_keys.clone())?;
        }

        Ok(result)
    }

    fn binding<T: Model>(&mut self, intent: Intent) -> Result<Arc<TableBinding<T>>> {
        self.cx.binding::<T>(&mut *self.conn, intent)
    }

    fn binding_on<T: Model>(&mut self, table: &str, intent: Intent) -> Result<Arc<TableBinding<T>>> {
        self.cx.binding_on::<T>(&mut *self.conn, table, intent)
    }

    fn exists_with<T>(&mut self, binding: &TableBinding<T>, obj: &T) -> Result<bool> {
        let sql = ParameterizedSql::new(
            binding.sql().exists_by_key().unwrap_or_default(),
            binding.key_values(obj)?,
        )?;

        self.with_rows(&sql, |mut rows, _| Ok(rows.advance()?.is_some()))
    }

    fn insert_with<T>(&mut self, binding: &TableBinding<T>, obj: &T) -> Result<u64> {
        let params = binding.insert_values(obj)?;
        self.execute(binding.sql().insert(), &params)
    }

    fn insert_and_get_with<T>(&mut self, binding: &TableBinding<T>, obj: &mut T) -> Result<u64> {
        let params = binding.insert_values(obj)?;
        let sql = binding.sql().insert();

        let log = self
            .cx
            .logger()
            .start(LogCategory::ExecuteUpdate, sql, params.len());
        let (count, keys) = self.conn.execute_returning_keys(sql, &params)?;
        log::finish(log, count);

        apply_generated_keys(binding, obj, keys)?;
        Ok(count)
    }

    fn merge_with<T>(&mut self, binding: &TableBinding<T>, obj: &T) -> Result<u64> {
        let params = binding.merge_values(obj)?;
        self.execute(binding.sql().merge().unwrap_or_default(), &params)
    }

    fn update_with<T>(&mut self, binding: &TableBinding<T>, obj: &T) -> Result<u64> {
        let Some(sql) = binding.sql().update() else {
            return Ok(0);
        };

        let params = binding.update_values(obj)?;
        self.execute(sql, &params)
    }

    fn delete_with<T>(&mut self, binding: &TableBinding<T>, obj: &T) -> Result<u64> {
        let params = binding.key_values(obj)?;
        self.execute(binding.sql().delete().unwrap_or_default(), &params)
    }

    /// Compiles caller SQL, applying the strict placeholder check when
    /// configured.
    fn parse(&self, sql: impl IntoParameterizedSql) -> Result<ParameterizedSql> {
        let sql = sql.into_parameterized_sql()?;

        let config = self.cx.config();
        if config.strict_named_parameters {
            ensure_fully_bound(&sql, &config.placeholder)?;
        }

        Ok(sql)
    }

    fn read_objects<T: Model>(&mut self, sql: &ParameterizedSql) -> Result<Vec<T>> {
        let resolved = self.cx.resolve::<T>()?;

        let objects = self.with_rows(sql, |rows, cx| {
            let mut mapper = RowMapper::new(resolved, cx.names());
            rows.collect(|row, _| mapper.load(row))
        })?;

        self.cx.logger().mapping(format_args!(
            "mapped {} row(s) to `{}`",
            objects.len(),
            std::any::type_name::<T>()
        ));
        Ok(objects)
    }

    /// Runs a query and hands its rows to `f`. The cursor is closed when
    /// `f` returns.
    fn with_rows<R>(
        &mut self,
        sql: &ParameterizedSql,
        f: impl FnOnce(Traverser<'_>, &Context) -> Result<R>,
    ) -> Result<R> {
        let cx = &*self.cx;
        let log = cx
            .logger()
            .start(LogCategory::ExecuteQuery, sql.sql(), sql.params().len());
        let cursor = self.conn.query(sql.sql(), sql.params())?;

        f(Traverser::new(cursor).with_log(log), cx)
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let log = self
            .cx
            .logger()
            .start(LogCategory::ExecuteUpdate, sql, params.len());
        let count = self.conn.execute(sql, params)?;
        log::finish(log, count);
        Ok(count)
    }
}

impl std::fmt::Debug for OrmConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrmConnection")
            .field("cx", &self.cx)
            .finish_non_exhaustive()
    }
}

fn present<T>(objects: &[T]) -> Vec<Option<&T>> {
    objects.iter().map(Some).collect()
}

/// Splits result columns between `N` objects by label prefix.
fn split<const N: usize>(
    columns: &[String],
    prefixes: &[&str; N],
) -> Result<[Vec<(usize, String)>; N]> {
    let groups = partition(columns, prefixes)?;

    groups
        .try_into()
        .map_err(|_| Error::invalid_argument("column partition has the wrong arity"))
}

/// Writes generated values into the auto-generated members of `obj`, in
/// column order. Columns without a writable member are skipped.
fn apply_generated_keys<T>(binding: &TableBinding<T>, obj: &mut T, keys: Vec<Value>) -> Result<()> {
    let resolved = binding.resolved();

    for (column, value) in binding.auto_generated_columns().zip(keys) {
        let Some(accessor) = resolved.accessor(&column.canonical) else {
            continue;
        };

        if accessor.is_writable() {
            accessor.set(obj, value, &column.canonical)?;
        }
    }

    Ok(())
}
