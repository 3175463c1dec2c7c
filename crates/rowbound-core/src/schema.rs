mod column;
pub use column::{ColumnMetadata, SqlType};

mod db;
pub use db::DbMetadata;

pub mod descriptor;
pub use descriptor::TypeDescriptor;

mod table;
pub use table::TableMetadata;
