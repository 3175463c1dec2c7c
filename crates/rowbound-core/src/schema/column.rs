/// Column metadata reported by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    /// Column name as reported by the database
    pub name: String,

    /// Column type hint
    pub ty: SqlType,

    /// True if the column accepts `NULL`
    pub nullable: bool,

    /// Position within the primary key, if the column is part of it
    pub primary_key: Option<usize>,

    /// True if the database assigns the value on insert
    pub auto_generated: bool,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, ty: SqlType) -> ColumnMetadata {
        ColumnMetadata {
            name: name.into(),
            ty,
            nullable: true,
            primary_key: None,
            auto_generated: false,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn primary_key(mut self, position: usize) -> Self {
        self.primary_key = Some(position);
        self.nullable = false;
        self
    }

    pub fn auto_generated(mut self, auto_generated: bool) -> Self {
        self.auto_generated = auto_generated;
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key.is_some()
    }
}

/// Database column type, as far as mapping cares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlType {
    Boolean,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal,
    Text,
    VarChar(Option<u64>),
    Blob,
    Date,
    Time,
    Timestamp,
    Uuid,

    /// A type name the mapping layer does not interpret
    Other(String),
}

impl SqlType {
    /// Interprets a declared type name such as `VARCHAR(255)` or `int8`.
    pub fn from_type_name(name: &str) -> SqlType {
        let upper = name.trim().to_ascii_uppercase();
        let (base, args) = match upper.find('(') {
            Some(open) => (
                upper[..open].trim(),
                Some(upper[open + 1..].trim_end_matches(')').trim()),
            ),
            None => (upper.as_str(), None),
        };

        match base {
            "BOOL" | "BOOLEAN" | "BIT" => SqlType::Boolean,
            "INT" | "INTEGER" | "INT2" | "INT4" | "SMALLINT" | "TINYINT" | "MEDIUMINT" => {
                SqlType::Integer
            }
            "BIGINT" | "INT8" => SqlType::BigInt,
            "REAL" | "FLOAT" | "FLOAT4" => SqlType::Real,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => SqlType::Double,
            "DECIMAL" | "NUMERIC" => SqlType::Decimal,
            "TEXT" | "CLOB" | "STRING" => SqlType::Text,
            "VARCHAR" | "CHAR" | "CHARACTER" | "NVARCHAR" | "NCHAR" | "CHARACTER VARYING" => {
                SqlType::VarChar(args.and_then(|args| args.parse().ok()))
            }
            "BLOB" | "BINARY" | "VARBINARY" | "BYTEA" => SqlType::Blob,
            "DATE" => SqlType::Date,
            "TIME" => SqlType::Time,
            "TIMESTAMP" | "DATETIME" | "TIMESTAMPTZ" => SqlType::Timestamp,
            "UUID" => SqlType::Uuid,
            _ => SqlType::Other(name.trim().to_string()),
        }
    }
}
