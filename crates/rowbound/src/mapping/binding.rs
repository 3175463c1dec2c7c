use super::{table_name, ResolvedType};

use rowbound_core::{
    name::{CanonicalName, Canonicalizer},
    schema::{DbMetadata, SqlType},
    stmt::Value,
    Error, Result,
};
use rowbound_sql::{Flavor, SqlColumn, TableSql};

use std::{collections::HashSet, fmt, sync::Arc};

/// What a table binding is about to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Read,
    Insert,
    Update,
    Delete,
    Merge,
    ReadByKey,
}

impl Intent {
    /// Keyed intents address rows by primary key.
    pub fn is_keyed(self) -> bool {
        matches!(
            self,
            Intent::Update | Intent::Delete | Intent::Merge | Intent::ReadByKey
        )
    }
}

/// A column shared by the table and the mapped type.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundColumn {
    /// Column name as reported by the database
    pub name: String,

    pub canonical: CanonicalName,

    pub ty: SqlType,

    pub nullable: bool,

    /// Position within the primary key
    pub primary_key: Option<usize>,

    pub auto_generated: bool,
}

/// A mapped type bound to a database table.
///
/// Holds the columns both sides know about, in table order, and the SQL
/// templates built from them.
pub struct TableBinding<T> {
    resolved: Arc<ResolvedType<T>>,

    table: String,

    columns: Vec<BoundColumn>,

    /// True if the table declares a primary key
    has_key: bool,

    /// Primary key columns with no accessor, in key order
    missing_keys: Vec<String>,

    sql: TableSql,
}

impl<T> TableBinding<T> {
    /// Binds `resolved` to its table in `metadata`.
    ///
    /// With `strict` set, every mapped member must have a column.
    pub fn bind(
        resolved: Arc<ResolvedType<T>>,
        metadata: &DbMetadata,
        names: &Canonicalizer,
        flavor: Flavor,
        strict: bool,
    ) -> Result<TableBinding<T>> {
        let marker = resolved.table_marker().map(str::to_string);
        Self::bind_on(resolved, marker.as_deref(), metadata, names, flavor, strict)
    }

    /// Binds `resolved` to `table` instead of the table its type maps to.
    /// With `table` unset this behaves like [`TableBinding::bind`] for a
    /// type with no table marker.
    pub fn bind_on(
        resolved: Arc<ResolvedType<T>>,
        table: Option<&str>,
        metadata: &DbMetadata,
        names: &Canonicalizer,
        flavor: Flavor,
        strict: bool,
    ) -> Result<TableBinding<T>> {
        let table = table_name::find_table(metadata, resolved.type_name(), table, names)?;

        let mut columns = vec![];
        let mut seen = HashSet::new();

        for column in &table.columns {
            let canonical = names.canonicalize(&column.name);

            if !resolved.contains(&canonical) || !seen.insert(canonical.clone()) {
                continue;
            }

            columns.push(BoundColumn {
                name: column.name.clone(),
                canonical,
                ty: column.ty.clone(),
                nullable: column.nullable,
                primary_key: column.primary_key,
                auto_generated: column.auto_generated,
            });
        }

        let missing_keys: Vec<String> = table
            .primary_key_columns()
            .into_iter()
            .filter(|column| !seen.contains(&names.canonicalize(&column.name)))
            .map(|column| column.name.clone())
            .collect();

        if strict {
            let unmatched: Vec<_> = resolved
                .accessors()
                .filter(|(name, _)| !seen.contains(*name))
                .map(|(name, _)| name.to_string())
                .collect();

            if !unmatched.is_empty() {
                return Err(Error::mapping(format!(
                    "members of `{}` have no column in table `{}`: {}",
                    resolved.type_name(),
                    table.name,
                    unmatched.join(", ")
                )));
            }
        }

        let has_key = table.has_primary_key();

        // A partial key would produce statements that match too many rows.
        let use_key = has_key && missing_keys.is_empty();

        let sql = TableSql::new(
            flavor,
            &table.name,
            columns
                .iter()
                .map(|column| {
                    let mut sql_column = SqlColumn::new(&column.name);
                    if let (true, Some(position)) = (use_key, column.primary_key) {
                        sql_column = sql_column.primary_key(position);
                    }
                    if column.auto_generated {
                        sql_column = sql_column.auto_generated();
                    }
                    sql_column
                })
                .collect(),
        );

        Ok(TableBinding {
            resolved,
            table: table.name.clone(),
            columns,
            has_key,
            missing_keys,
            sql,
        })
    }

    /// Fails with an unmappable key error if `intent` needs a primary key
    /// this binding cannot provide.
    pub fn require(&self, intent: Intent) -> Result<()> {
        if !intent.is_keyed() {
            return Ok(());
        }

        if !self.has_key {
            return Err(Error::unmappable_key(
                self.resolved.type_name(),
                &self.table,
                vec![],
            ));
        }

        if !self.missing_keys.is_empty() {
            return Err(Error::unmappable_key(
                self.resolved.type_name(),
                &self.table,
                self.missing_keys.clone(),
            ));
        }

        Ok(())
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn resolved(&self) -> &Arc<ResolvedType<T>> {
        &self.resolved
    }

    /// Bound columns in table order.
    pub fn columns(&self) -> &[BoundColumn] {
        &self.columns
    }

    /// Primary key columns without an accessor.
    pub fn missing_keys(&self) -> &[String] {
        &self.missing_keys
    }

    pub fn sql(&self) -> &TableSql {
        &self.sql
    }

    /// Columns the database generates on insert.
    pub fn auto_generated_columns(&self) -> impl Iterator<Item = &BoundColumn> {
        self.columns.iter().filter(|column| column.auto_generated)
    }

    pub(crate) fn insert_values(&self, obj: &T) -> Result<Vec<Value>> {
        self.values(obj, self.sql.insert_columns().iter().copied())
    }

    pub(crate) fn merge_values(&self, obj: &T) -> Result<Vec<Value>> {
        self.values(obj, self.sql.merge_columns())
    }

    /// Non-key values followed by key values.
    pub(crate) fn update_values(&self, obj: &T) -> Result<Vec<Value>> {
        self.values(
            obj,
            self.sql
                .value_columns()
                .iter()
                .chain(self.sql.key_columns())
                .copied(),
        )
    }

    pub(crate) fn key_values(&self, obj: &T) -> Result<Vec<Value>> {
        self.values(obj, self.sql.key_columns().iter().copied())
    }

    /// Checks that `key` supplies one value per primary key column.
    pub(crate) fn key_params(&self, key: Vec<Value>) -> Result<Vec<Value>> {
        let expected = self.sql.key_columns().len();

        if key.len() != expected {
            return Err(Error::invalid_argument(format!(
                "table `{}` has {expected} primary key column(s) but {} value(s) were given",
                self.table,
                key.len()
            )));
        }

        Ok(key)
    }

    fn values(&self, obj: &T, indices: impl Iterator<Item = usize>) -> Result<Vec<Value>> {
        indices
            .map(|i| {
                let column = &self.columns[i];
                self.resolved.get(obj, &column.canonical)
            })
            .collect()
    }
}

impl<T> fmt::Debug for TableBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableBinding")
            .field("type_name", &self.resolved.type_name())
            .field("table", &self.table)
            .field("columns", &self.columns)
            .field("missing_keys", &self.missing_keys)
            .finish()
    }
}
