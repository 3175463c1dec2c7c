use super::Error;

/// Error when a keyed operation is requested for a type that cannot supply
/// its table's primary key.
#[derive(Debug)]
pub(super) struct UnmappableKeyError {
    type_name: Box<str>,
    table: Box<str>,
    columns: Vec<String>,
}

impl std::error::Error for UnmappableKeyError {}

impl core::fmt::Display for UnmappableKeyError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "type `{}` cannot be used for keyed operations on table `{}`; ",
            self.type_name, self.table
        )?;

        if self.columns.is_empty() {
            f.write_str("the table has no primary key")
        } else {
            write!(
                f,
                "no accessor for primary key column(s) [{}]",
                self.columns.join(", ")
            )
        }
    }
}

impl Error {
    /// Creates an unmappable key error.
    ///
    /// An empty `columns` list means the table declares no primary key at all.
    pub fn unmappable_key(
        type_name: impl Into<String>,
        table: impl Into<String>,
        columns: Vec<String>,
    ) -> Error {
        Error::from(super::ErrorKind::UnmappableKey(UnmappableKeyError {
            type_name: type_name.into().into(),
            table: table.into().into(),
            columns,
        }))
    }

    /// Returns `true` if this error is an unmappable key error.
    pub fn is_unmappable_key(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::UnmappableKey(_)))
    }
}
