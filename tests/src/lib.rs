mod exec_log;
pub use exec_log::ExecLog;

mod logging_connection;
pub use logging_connection::{ExecOp, LoggingConnection, LoggingPool, OpKind};

pub mod prelude;

use rowbound::{config::Config, Db};
use rowbound_driver_sqlite::Sqlite;

use std::sync::Once;

/// An in-memory SQLite database with every driver call recorded.
pub struct Setup {
    pub db: Db,
    pub log: ExecLog,
}

impl Setup {
    /// Creates the tables of `schema` in a fresh database.
    pub fn new(schema: &str) -> Setup {
        Setup::with_config(schema, Config::default())
    }

    pub fn with_config(schema: &str, config: Config) -> Setup {
        init_tracing();

        let sqlite = Sqlite::in_memory().unwrap();
        sqlite.connect().unwrap().execute_script(schema).unwrap();

        let pool = LoggingPool::new(sqlite);
        let log = pool.exec_log();
        let db = Db::builder().config(config).build(pool).unwrap();

        Setup { db, log }
    }
}

/// Routes `tracing` output to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
