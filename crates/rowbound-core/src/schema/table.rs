use super::ColumnMetadata;

/// A table as reported by the database metadata interface.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMetadata {
    /// Table name as reported by the database
    pub name: String,

    /// Columns in database order
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnMetadata>) -> TableMetadata {
        TableMetadata {
            name: name.into(),
            columns,
        }
    }

    /// Case-insensitive column lookup.
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name))
    }

    /// Primary key columns in key order.
    pub fn primary_key_columns(&self) -> Vec<&ColumnMetadata> {
        let mut columns: Vec<_> = self
            .columns
            .iter()
            .filter(|column| column.is_primary_key())
            .collect();
        columns.sort_by_key(|column| column.primary_key);
        columns
    }

    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(ColumnMetadata::is_primary_key)
    }
}
