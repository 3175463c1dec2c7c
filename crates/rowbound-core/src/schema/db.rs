use super::TableMetadata;

/// A snapshot of the database's tables.
///
/// Bindings built from a snapshot never observe later schema changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbMetadata {
    /// Database product name, e.g. `SQLite`
    pub product_name: String,

    pub tables: Vec<TableMetadata>,
}

impl DbMetadata {
    pub fn new(product_name: impl Into<String>, tables: Vec<TableMetadata>) -> DbMetadata {
        DbMetadata {
            product_name: product_name.into(),
            tables,
        }
    }

    /// Case-insensitive table lookup.
    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.tables
            .iter()
            .find(|table| table.name.eq_ignore_ascii_case(name))
    }
}
