//! Mapping between rows and Rust values.
//!
//! [`resolve`] turns a type descriptor into an accessor table, a
//! [`TableBinding`] pairs that table with database columns, and the row
//! mapper applies it to cursor rows.

mod binding;
pub use binding::{BoundColumn, Intent, TableBinding};

mod mapper;
pub(crate) use mapper::RowMapper;

mod params;
pub use params::ObjectParameters;

pub mod resolve;
pub use resolve::{Accessor, ResolvedType};

mod row;
pub use row::{RowMap, RowView};

pub(crate) mod table_name;

mod traverse;
pub use traverse::LazyRows;
pub(crate) use traverse::Traverser;

mod tuple;
pub(crate) use tuple::partition;
