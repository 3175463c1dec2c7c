use rowbound_core::{
    schema::{ColumnMetadata, DbMetadata, SqlType, TableMetadata},
    Error, Result,
};
use rusqlite::Connection;

/// Reads the table layout from `sqlite_master` and `PRAGMA table_info`.
pub(crate) fn load(connection: &Connection) -> Result<DbMetadata> {
    let mut stmt = connection
        .prepare(
            "select name, sql from sqlite_master \
             where type = 'table' and name not like 'sqlite_%' order by name",
        )
        .map_err(Error::driver)?;

    let tables = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })
        .map_err(Error::driver)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Error::driver)?;

    let tables = tables
        .into_iter()
        .map(|(name, sql)| table(connection, name, sql.as_deref().unwrap_or_default()))
        .collect::<Result<Vec<_>>>()?;

    Ok(DbMetadata::new("SQLite", tables))
}

fn table(connection: &Connection, name: String, create_sql: &str) -> Result<TableMetadata> {
    let pragma = format!("pragma table_info(\"{}\")", name.replace('"', "\"\""));
    let mut stmt = connection.prepare(&pragma).map_err(Error::driver)?;

    let mut columns = stmt
        .query_map([], |row| {
            let name: String = row.get("name")?;
            let ty: String = row.get("type")?;
            let not_null: bool = row.get("notnull")?;
            let pk: i64 = row.get("pk")?;

            let mut column = ColumnMetadata::new(name, SqlType::from_type_name(&ty));
            column.nullable = !not_null;
            if pk > 0 {
                column = column.primary_key((pk - 1) as usize);
            }
            Ok((column, ty))
        })
        .map_err(Error::driver)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Error::driver)?;

    // An `INTEGER PRIMARY KEY AUTOINCREMENT` column is assigned by SQLite.
    let key_columns = columns.iter().filter(|(c, _)| c.is_primary_key()).count();
    let autoincrement = create_sql.to_ascii_uppercase().contains("AUTOINCREMENT");

    for (column, ty) in &mut columns {
        column.auto_generated = autoincrement
            && key_columns == 1
            && column.is_primary_key()
            && ty.eq_ignore_ascii_case("INTEGER");
    }

    Ok(TableMetadata::new(
        name,
        columns.into_iter().map(|(column, _)| column).collect(),
    ))
}
