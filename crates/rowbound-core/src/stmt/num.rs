use super::Value;
use crate::{Error, Result};

macro_rules! impl_num {
    (
        $(
            $variant:ident($ty:ty) {
                $to:ident
                $is:ident
            } )*
    ) => {
        impl Value {
            $(
                pub fn $is(&self) -> bool {
                    matches!(self, Self::$variant(_))
                }

                pub fn $to(&self) -> Option<$ty> {
                    match *self {
                        Self::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            )*
        }

        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl From<&$ty> for Value {
                fn from(value: &$ty) -> Self {
                    Self::$variant(*value)
                }
            }
        )*
    };
}

impl_num! {
    I8(i8) {
        to_i8
        is_i8
    }
    I16(i16) {
        to_i16
        is_i16
    }
    I32(i32) {
        to_i32
        is_i32
    }
    I64(i64) {
        to_i64
        is_i64
    }
    U8(u8) {
        to_u8
        is_u8
    }
    U16(u16) {
        to_u16
        is_u16
    }
    U32(u32) {
        to_u32
        is_u32
    }
    U64(u64) {
        to_u64
        is_u64
    }
}

// Cross-width conversions go through std's `TryFrom` so out-of-range values
// fail instead of wrapping.

macro_rules! try_convert {
    ($val:expr, $target_ty:ty) => {
        <$target_ty>::try_from($val).map_err(|_| {
            Error::from(anyhow::anyhow!(
                "value {} is out of range for {}",
                $val,
                stringify!($target_ty)
            ))
        })
    };
}

macro_rules! parse_string {
    ($s:expr, $target_ty:ty) => {
        $s.trim().parse::<$target_ty>().map_err(|_| {
            Error::from(anyhow::anyhow!(
                "cannot parse '{}' as {}",
                $s,
                stringify!($target_ty)
            ))
        })
    };
}

macro_rules! impl_try_from_int {
    ($($ty:ident)*) => {
        $(
            impl TryFrom<Value> for $ty {
                type Error = Error;

                fn try_from(value: Value) -> Result<Self> {
                    match value {
                        Value::I8(val) => try_convert!(val, $ty),
                        Value::I16(val) => try_convert!(val, $ty),
                        Value::I32(val) => try_convert!(val, $ty),
                        Value::I64(val) => try_convert!(val, $ty),
                        Value::U8(val) => try_convert!(val, $ty),
                        Value::U16(val) => try_convert!(val, $ty),
                        Value::U32(val) => try_convert!(val, $ty),
                        Value::U64(val) => try_convert!(val, $ty),
                        Value::String(ref s) => parse_string!(s, $ty),
                        _ => Err(Error::type_conversion(value, stringify!($ty))),
                    }
                }
            }
        )*
    };
}

impl_try_from_int! { i8 i16 i32 i64 u8 u16 u32 u64 }

impl TryFrom<Value> for usize {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let wide = u64::try_from(value.clone())?;
        usize::try_from(wide).map_err(|_| Error::type_conversion(value, "usize"))
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::F64(val) => Ok(val),
            Value::F32(val) => Ok(val.into()),
            Value::String(ref s) => parse_string!(s, f64),
            _ => match value.as_i64() {
                Some(val) => Ok(val as f64),
                None => Err(Error::type_conversion(value, "f64")),
            },
        }
    }
}

impl TryFrom<Value> for f32 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::F32(val) => Ok(val),
            Value::F64(val) => Ok(val as f32),
            Value::String(ref s) => parse_string!(s, f32),
            _ => match value.as_i64() {
                Some(val) => Ok(val as f32),
                None => Err(Error::type_conversion(value, "f32")),
            },
        }
    }
}
