use super::Value;
use crate::Result;

/// A Rust type stored in a single column.
///
/// `#[derive(Model)]` requires every mapped field to implement this trait.
pub trait Primitive: Sized {
    /// `true` for types that accept SQL `NULL`, such as `Option<T>`.
    ///
    /// Constructor parameters of nullable types are optional during row
    /// mapping: a missing column loads as `NULL`.
    const NULLABLE: bool = false;

    fn load(value: Value) -> Result<Self>;

    fn to_value(&self) -> Value;
}

macro_rules! impl_primitive {
    ($($ty:ty)*) => {
        $(
            impl Primitive for $ty {
                fn load(value: Value) -> Result<Self> {
                    value.try_into()
                }

                fn to_value(&self) -> Value {
                    Value::from(self.clone())
                }
            }
        )*
    };
}

impl_primitive! {
    bool
    i8 i16 i32 i64
    u8 u16 u32 u64
    f32 f64
    String
    Vec<u8>
    uuid::Uuid
}

impl Primitive for Value {
    const NULLABLE: bool = true;

    fn load(value: Value) -> Result<Self> {
        Ok(value)
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: Primitive> Primitive for Option<T> {
    const NULLABLE: bool = true;

    fn load(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(T::load(value)?))
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}
