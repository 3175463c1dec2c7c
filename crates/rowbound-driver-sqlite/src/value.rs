use rowbound_core::stmt::Value as CoreValue;
use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};

/// Binds a rowbound value as a SQLite parameter.
#[derive(Debug)]
pub(crate) struct Param<'a>(pub(crate) &'a CoreValue);

impl Param<'_> {
    pub(crate) fn all(values: &[CoreValue]) -> impl Iterator<Item = Param<'_>> {
        values.iter().map(Param)
    }
}

/// Reads column `index` of `row`. SQLite reports storage classes only, so
/// integers load as `I64` and reals as `F64`.
pub(crate) fn from_sql(row: &Row<'_>, index: usize) -> rusqlite::Result<CoreValue> {
    let value = match row.get_ref(index)? {
        ValueRef::Null => CoreValue::Null,
        ValueRef::Integer(v) => CoreValue::I64(v),
        ValueRef::Real(v) => CoreValue::F64(v),
        ValueRef::Text(v) => CoreValue::String(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => CoreValue::Bytes(v.to_vec()),
    };
    Ok(value)
}

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use CoreValue::*;

        match self.0 {
            Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            I8(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            I16(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            I32(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            U8(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            U16(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            U32(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            U64(v) => i64::try_from(*v)
                .map(|v| ToSqlOutput::Owned(SqlValue::Integer(v)))
                .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err))),
            F32(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v as f64))),
            F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            Uuid(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(v.to_string()))),
            Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            List(_) => Err(rusqlite::Error::ToSqlConversionFailure(
                "list values must be expanded before binding".into(),
            )),
        }
    }
}
