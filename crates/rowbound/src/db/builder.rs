use super::{Connect, Db};
use crate::{config::Config, Context, Result};

use rowbound_core::driver::Pool;

use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Replaces the whole configuration.
    pub fn config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }

    /// Loads the configuration from a TOML document.
    pub fn config_toml(&mut self, toml: &str) -> Result<&mut Self> {
        self.config = Config::from_toml_str(toml)?;
        Ok(self)
    }

    /// Opens the database named by `url` with a built-in driver.
    pub fn connect(&mut self, url: &str) -> Result<Db> {
        self.build(Connect::new(url)?.open()?)
    }

    pub fn build(&mut self, pool: impl Pool) -> Result<Db> {
        let cx = Context::new(self.config.clone())?;

        Ok(Db {
            cx: Arc::new(cx),
            pool: Arc::new(pool),
        })
    }
}
