mod metadata;

mod statement;
use statement::SqliteStatement;

mod value;
use value::Param;

use rowbound_core::{
    driver::{self, BufferedCursor, Pool, RowCursor},
    schema::DbMetadata,
    stmt::Value,
    Error, Result,
};
use rusqlite::{Connection as RusqliteConnection, OpenFlags};
use url::Url;

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

/// A SQLite database that hands out connections.
#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),

    /// A private in-memory database shared by every connection acquired from
    /// this value. It lives as long as this value.
    InMemory {
        uri: String,
        keepalive: Mutex<RusqliteConnection>,
    },
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver)?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_argument(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Self::in_memory()
        } else {
            Ok(Self::open(url.path()))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Result<Self> {
        let uri = format!("file:rowbound-{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
        let keepalive = open_uri(&uri)?;

        Ok(Self::InMemory {
            uri,
            keepalive: Mutex::new(keepalive),
        })
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    pub fn url(&self) -> String {
        match self {
            Sqlite::InMemory { .. } => "sqlite::memory:".to_string(),
            Sqlite::File(path) => format!("sqlite:{}", path.display()),
        }
    }

    pub fn connect(&self) -> Result<Connection> {
        match self {
            Sqlite::File(path) => Connection::open(path),
            Sqlite::InMemory { uri, .. } => Ok(Connection {
                connection: open_uri(uri)?,
            }),
        }
    }
}

impl Pool for Sqlite {
    fn acquire(&self) -> Result<Box<dyn driver::Connection>> {
        Ok(Box::new(self.connect()?))
    }
}

fn open_uri(uri: &str) -> Result<RusqliteConnection> {
    RusqliteConnection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_URI,
    )
    .map_err(Error::driver)
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
}

impl Connection {
    /// A private in-memory database, dropped with the connection.
    pub fn in_memory() -> Result<Self> {
        let connection = RusqliteConnection::open_in_memory().map_err(Error::driver)?;
        Ok(Self { connection })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver)?;
        Ok(Self { connection })
    }

    /// Runs one or more statements without parameters, such as a schema
    /// script.
    pub fn execute_script(&mut self, sql: &str) -> Result<()> {
        self.connection.execute_batch(sql).map_err(Error::driver)
    }
}

impl driver::Connection for Connection {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let mut stmt = self.connection.prepare_cached(sql).map_err(Error::driver)?;
        let count = stmt
            .execute(rusqlite::params_from_iter(Param::all(params)))
            .map_err(Error::driver)?;
        Ok(count as u64)
    }

    fn execute_returning_keys(&mut self, sql: &str, params: &[Value]) -> Result<(u64, Vec<Value>)> {
        let count = self.execute(sql, params)?;
        Ok((count, generated_keys(&self.connection, count)))
    }

    fn query<'a>(&'a mut self, sql: &str, params: &[Value]) -> Result<Box<dyn RowCursor + 'a>> {
        let mut stmt = self.connection.prepare_cached(sql).map_err(Error::driver)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(Param::all(params)))
            .map_err(Error::driver)?;

        let mut buffered = vec![];
        while let Some(row) = rows.next().map_err(Error::driver)? {
            let values = (0..width)
                .map(|index| value::from_sql(row, index))
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(Error::driver)?;
            buffered.push(values);
        }

        Ok(Box::new(BufferedCursor::new(columns, buffered)))
    }

    fn prepare<'a>(&'a mut self, sql: &str) -> Result<Box<dyn driver::Statement + 'a>> {
        Ok(Box::new(SqliteStatement::new(&self.connection, sql)?))
    }

    fn prepare_returning_keys<'a>(
        &'a mut self,
        sql: &str,
    ) -> Result<Box<dyn driver::Statement + 'a>> {
        Ok(Box::new(
            SqliteStatement::new(&self.connection, sql)?.returning_keys(),
        ))
    }

    fn metadata(&mut self) -> Result<DbMetadata> {
        metadata::load(&self.connection)
    }
}

/// The rowid of the last insert, when the statement wrote a row.
fn generated_keys(connection: &RusqliteConnection, count: u64) -> Vec<Value> {
    if count == 0 {
        return vec![];
    }

    vec![Value::I64(connection.last_insert_rowid())]
}
