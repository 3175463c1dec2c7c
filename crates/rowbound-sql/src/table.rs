//! Per-table SQL templates.

use crate::{
    delim::{markers, And, Comma},
    Flavor,
};

use dashmap::DashMap;
use std::sync::Arc;

/// A column that takes part in a table binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlColumn {
    pub name: String,

    /// Position within the primary key
    pub primary_key: Option<usize>,

    /// Omitted from inserts
    pub auto_generated: bool,
}

impl SqlColumn {
    pub fn new(name: impl Into<String>) -> SqlColumn {
        SqlColumn {
            name: name.into(),
            primary_key: None,
            auto_generated: false,
        }
    }

    pub fn primary_key(mut self, position: usize) -> Self {
        self.primary_key = Some(position);
        self
    }

    pub fn auto_generated(mut self) -> Self {
        self.auto_generated = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RowsKind {
    Insert,
    Merge,
}

/// Precomputed statements for one table and an ordered column list.
///
/// Parameter order for each template is exposed through the `*_columns`
/// accessors, as indices into [`TableSql::columns`].
#[derive(Debug)]
pub struct TableSql {
    flavor: Flavor,
    table: String,
    columns: Vec<SqlColumn>,

    insert_columns: Vec<usize>,
    key_columns: Vec<usize>,
    value_columns: Vec<usize>,

    insert: String,
    merge: Option<String>,
    update: Option<String>,
    delete: Option<String>,
    select_by_key: Option<String>,
    exists_by_key: Option<String>,
    select_all: String,
    count: String,
    delete_all: String,

    /// Multi-row statements by kind and row count
    rows: DashMap<(RowsKind, usize), Arc<str>>,
}

impl TableSql {
    pub fn new(flavor: Flavor, table: impl Into<String>, columns: Vec<SqlColumn>) -> TableSql {
        let table = table.into();

        let insert_columns: Vec<usize> = (0..columns.len())
            .filter(|&i| !columns[i].auto_generated)
            .collect();

        let mut key_columns: Vec<usize> = (0..columns.len())
            .filter(|&i| columns[i].primary_key.is_some())
            .collect();
        key_columns.sort_by_key(|&i| columns[i].primary_key);

        let value_columns: Vec<usize> = (0..columns.len())
            .filter(|&i| columns[i].primary_key.is_none())
            .collect();

        let assign = |i: &usize| format!("{} = ?", columns[*i].name);
        let key_filter = And(key_columns.iter().map(assign).collect::<Vec<_>>()).to_string();
        let has_key = !key_columns.is_empty();

        let insert = format!(
            "insert into {table} ({}) values ({})",
            Comma(insert_columns.iter().map(|i| &columns[*i].name)),
            markers(insert_columns.len())
        );

        let update = (has_key && !value_columns.is_empty()).then(|| {
            format!(
                "update {table} set {} where {key_filter}",
                Comma(value_columns.iter().map(assign))
            )
        });

        let delete = has_key.then(|| format!("delete from {table} where {key_filter}"));
        let select_by_key = has_key.then(|| format!("select * from {table} where {key_filter}"));
        let exists_by_key = has_key.then(|| format!("select 1 from {table} where {key_filter}"));

        let mut sql = TableSql {
            flavor,
            select_all: format!("select * from {table}"),
            count: format!("select count(*) from {table}"),
            delete_all: format!("delete from {table}"),
            table,
            columns,
            insert_columns,
            key_columns,
            value_columns,
            insert,
            merge: None,
            update,
            delete,
            select_by_key,
            exists_by_key,
            rows: DashMap::new(),
        };

        sql.merge = sql.merge_sql(1);
        sql
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[SqlColumn] {
        &self.columns
    }

    /// Columns bound by insert statements, in parameter order.
    pub fn insert_columns(&self) -> &[usize] {
        &self.insert_columns
    }

    /// Primary key columns in key order. Bound last by update statements
    /// and alone by delete, select and exists statements.
    pub fn key_columns(&self) -> &[usize] {
        &self.key_columns
    }

    /// Non-key columns, bound first by update statements.
    pub fn value_columns(&self) -> &[usize] {
        &self.value_columns
    }

    /// Columns bound by merge statements: every column, in column order.
    pub fn merge_columns(&self) -> std::ops::Range<usize> {
        0..self.columns.len()
    }

    pub fn insert(&self) -> &str {
        &self.insert
    }

    pub fn merge(&self) -> Option<&str> {
        self.merge.as_deref()
    }

    pub fn update(&self) -> Option<&str> {
        self.update.as_deref()
    }

    pub fn delete(&self) -> Option<&str> {
        self.delete.as_deref()
    }

    pub fn select_by_key(&self) -> Option<&str> {
        self.select_by_key.as_deref()
    }

    pub fn exists_by_key(&self) -> Option<&str> {
        self.exists_by_key.as_deref()
    }

    pub fn select_all(&self) -> &str {
        &self.select_all
    }

    pub fn count(&self) -> &str {
        &self.count
    }

    pub fn delete_all(&self) -> &str {
        &self.delete_all
    }

    /// An insert of `rows` rows in a single statement.
    pub fn multi_row_insert(&self, rows: usize) -> Arc<str> {
        if let Some(sql) = self.rows.get(&(RowsKind::Insert, rows)) {
            return sql.clone();
        }

        let sql: Arc<str> = self.insert_sql(rows).into();
        self.rows
            .entry((RowsKind::Insert, rows))
            .or_insert(sql)
            .clone()
    }

    /// A merge of `rows` rows in a single statement. `None` when the table
    /// has no primary key.
    pub fn multi_row_merge(&self, rows: usize) -> Option<Arc<str>> {
        if let Some(sql) = self.rows.get(&(RowsKind::Merge, rows)) {
            return Some(sql.clone());
        }

        let sql: Arc<str> = self.merge_sql(rows)?.into();
        Some(
            self.rows
                .entry((RowsKind::Merge, rows))
                .or_insert(sql)
                .clone(),
        )
    }

    fn tuples(&self, width: usize, rows: usize) -> String {
        let tuple = format!("({})", markers(width));
        Comma(std::iter::repeat(tuple.as_str()).take(rows)).to_string()
    }

    fn insert_sql(&self, rows: usize) -> String {
        format!(
            "insert into {} ({}) values {}",
            self.table,
            Comma(self.insert_columns.iter().map(|i| &self.columns[*i].name)),
            self.tuples(self.insert_columns.len(), rows)
        )
    }

    fn merge_sql(&self, rows: usize) -> Option<String> {
        if self.key_columns.is_empty() {
            return None;
        }

        let table = &self.table;
        let all = Comma(self.columns.iter().map(|column| &column.name));
        let keys = Comma(self.key_columns.iter().map(|i| &self.columns[*i].name));
        let values = self.tuples(self.columns.len(), rows);

        let sql = match self.flavor {
            Flavor::Standard => {
                format!("merge into {table} ({all}) key ({keys}) values {values}")
            }
            Flavor::Sqlite | Flavor::Postgresql => {
                let action = if self.value_columns.is_empty() {
                    "do nothing".to_string()
                } else {
                    format!(
                        "do update set {}",
                        Comma(self.value_columns.iter().map(|i| {
                            let name = &self.columns[*i].name;
                            format!("{name} = excluded.{name}")
                        }))
                    )
                };
                format!("insert into {table} ({all}) values {values} on conflict ({keys}) {action}")
            }
            Flavor::Mysql => {
                let updated = if self.value_columns.is_empty() {
                    &self.key_columns[..1]
                } else {
                    &self.value_columns[..]
                };
                format!(
                    "insert into {table} ({all}) values {values} on duplicate key update {}",
                    Comma(updated.iter().map(|i| {
                        let name = &self.columns[*i].name;
                        format!("{name} = values({name})")
                    }))
                )
            }
        };

        Some(sql)
    }
}
