//! Common imports for test files

pub use crate::{ExecLog, OpKind, Setup};

pub use rowbound::{
    config::{Config, MultiRowStrategy},
    Error, Model, OrmConnection, Result, Value, WriteOp,
};

pub use std::collections::HashMap;
