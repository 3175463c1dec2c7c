use serde::Deserialize;

/// SQL dialect, used only where standard SQL has no portable form.
///
/// Today that is the upsert statement behind merge operations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// `MERGE INTO t (...) KEY (...) VALUES ...`
    #[default]
    Standard,

    /// `INSERT ... ON CONFLICT (...) DO UPDATE SET c = excluded.c`
    Sqlite,

    /// Same upsert form as SQLite
    Postgresql,

    /// `INSERT ... ON DUPLICATE KEY UPDATE c = VALUES(c)`
    Mysql,
}

impl Flavor {
    /// Guesses the flavor from a database product name.
    pub fn from_product_name(name: &str) -> Flavor {
        let name = name.to_ascii_lowercase();

        if name.contains("sqlite") {
            Flavor::Sqlite
        } else if name.contains("postgres") {
            Flavor::Postgresql
        } else if name.contains("mysql") || name.contains("mariadb") {
            Flavor::Mysql
        } else {
            Flavor::Standard
        }
    }
}
