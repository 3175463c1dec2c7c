//! Renders values as SQL literals for logging.
//!
//! The output is meant for humans reading logs; statements always bind
//! values as parameters.

use rowbound_core::stmt::Value;
use std::fmt;

/// Displays a value as a SQL literal.
pub struct Literal<'a>(pub &'a Value);

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Null => f.write_str("NULL"),
            Value::Bool(true) => f.write_str("TRUE"),
            Value::Bool(false) => f.write_str("FALSE"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Uuid(v) => write!(f, "'{v}'"),
            Value::Bytes(v) => {
                f.write_str("X'")?;
                for byte in v {
                    write!(f, "{byte:02X}")?;
                }
                f.write_str("'")
            }
            Value::List(items) => {
                let mut s = "";
                for item in items {
                    write!(f, "{s}{}", Literal(item))?;
                    s = ", ";
                }
                Ok(())
            }
        }
    }
}

pub fn render(value: &Value) -> String {
    Literal(value).to_string()
}
