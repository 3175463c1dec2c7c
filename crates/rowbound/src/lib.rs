mod batch;
pub use batch::{ChunkOutcome, RowOutcome, WriteOp, WriteResult};

pub mod config;
pub use config::Config;

mod connection;
pub use connection::OrmConnection;

mod context;
pub use context::Context;

pub mod db;
pub use db::Db;

mod guard;

mod log;

pub mod mapping;
pub use mapping::{LazyRows, RowMap, RowView};

mod model;
pub use model::Model;

pub use rowbound_macros::Model;

pub use rowbound_core::{
    bail, driver, err,
    schema::{self, TypeDescriptor},
    stmt::{Primitive, Value},
    CanonicalName, Error, Result,
};

pub use rowbound_sql::{
    Flavor, IntoParameterizedSql, NamedParameterSql, NamedPlaceholder, OrderedParameterSql,
    ParameterSource, ParameterizedSql,
};

#[doc(hidden)]
pub mod codegen_support {
    pub use crate::{Model, Result};
    pub use rowbound_core::{
        schema::descriptor::{Constructor, CtorParam, Member, TypeDescriptor},
        stmt::{Primitive, Value},
    };
    pub use std::{default::Default, vec::Vec};
}
