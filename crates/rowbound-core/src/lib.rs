pub mod driver;
pub use driver::Connection;

mod error;
pub use error::{Error, IntoError};

pub mod name;
pub use name::{CanonicalName, Canonicalizer};

pub mod schema;

pub mod stmt;

/// A Result type alias that uses Rowbound's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
