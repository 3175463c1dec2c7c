use crate::Result;

use rowbound_core::{driver::Pool, Error};

use url::Url;

/// Selects a built-in driver from a database URL.
#[derive(Debug)]
pub struct Connect {
    url: Url,
}

impl Connect {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|err| Error::invalid_argument(format!("invalid database url `{url}`: {err}")))?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Opens a connection source for the URL's scheme.
    pub fn open(&self) -> Result<Box<dyn Pool>> {
        match self.url.scheme() {
            "sqlite" => open_sqlite(&self.url),
            scheme => Err(Error::invalid_argument(format!(
                "unsupported database; scheme={scheme}; url={}",
                self.url
            ))),
        }
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(url: &Url) -> Result<Box<dyn Pool>> {
    let driver = rowbound_driver_sqlite::Sqlite::new(url.as_str())?;
    Ok(Box::new(driver))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_url: &Url) -> Result<Box<dyn Pool>> {
    Err(Error::invalid_argument("`sqlite` feature not enabled"))
}
