mod builder;
pub use builder::Builder;

mod connect;
pub use connect::Connect;

use crate::{Context, OrmConnection, Result};

use rowbound_core::driver::Pool;

use std::sync::Arc;

/// A database handle.
///
/// Pairs a connection source with the mapping [`Context`]. Cloning is cheap
/// and every clone shares the same caches.
#[derive(Clone)]
pub struct Db {
    cx: Arc<Context>,
    pool: Arc<dyn Pool>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.cx
    }

    /// Acquires a connection. It is returned to its source when dropped.
    pub fn connect(&self) -> Result<OrmConnection> {
        let conn = self.pool.acquire()?;
        Ok(OrmConnection::new(self.cx.clone(), conn))
    }

    /// Runs `f` with a connection acquired for the duration of the call.
    pub fn run<R>(&self, f: impl FnOnce(&mut OrmConnection) -> Result<R>) -> Result<R> {
        let mut conn = self.connect()?;
        f(&mut conn)
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db").field("cx", &self.cx).finish_non_exhaustive()
    }
}
