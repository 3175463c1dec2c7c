mod delim;

pub mod flavor;
pub use flavor::Flavor;

pub mod literal;

pub mod named;
pub use named::{ensure_fully_bound, NamedParameterSql, NamedPlaceholder, ParameterSource};

pub mod ordered;
pub use ordered::OrderedParameterSql;

mod parameterized;
pub use parameterized::{IntoParameterizedSql, ParameterizedSql};

mod scan;

pub mod table;
pub use table::{SqlColumn, TableSql};
