use crate::{stmt::Value, Error, Result};

/// Identifies a column of the current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRef<'a> {
    /// Zero-based column position
    Index(usize),

    /// Column label, matched case-insensitively
    Name(&'a str),
}

impl From<usize> for ColumnRef<'_> {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl<'a> From<&'a str> for ColumnRef<'a> {
    fn from(name: &'a str) -> Self {
        ColumnRef::Name(name)
    }
}

/// A forward-only cursor over query results.
pub trait RowCursor {
    /// Column labels in result order.
    fn column_names(&self) -> &[String];

    /// Advances to the next row. Returns `false` once the rows are exhausted.
    fn next(&mut self) -> Result<bool>;

    /// Reads a column of the current row.
    fn get(&self, column: ColumnRef<'_>) -> Result<Value>;

    /// Releases the cursor. Further calls to `next` return `false`.
    fn close(&mut self) -> Result<()>;
}

/// A cursor over rows already held in memory.
///
/// Drivers that materialize results eagerly return this type.
#[derive(Debug, Clone, Default)]
pub struct BufferedCursor {
    columns: Vec<String>,
    rows: std::collections::VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
    closed: bool,
}

impl BufferedCursor {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> BufferedCursor {
        BufferedCursor {
            columns,
            rows: rows.into(),
            current: None,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn position(&self, column: ColumnRef<'_>) -> Result<usize> {
        match column {
            ColumnRef::Index(index) if index < self.columns.len() => Ok(index),
            ColumnRef::Index(index) => Err(Error::invalid_argument(format!(
                "column index {index} out of bounds; width={}",
                self.columns.len()
            ))),
            ColumnRef::Name(name) => self
                .columns
                .iter()
                .position(|column| column.eq_ignore_ascii_case(name))
                .ok_or_else(|| Error::invalid_argument(format!("no column named `{name}`"))),
        }
    }
}

impl RowCursor for BufferedCursor {
    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn next(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }

        self.current = self.rows.pop_front();
        Ok(self.current.is_some())
    }

    fn get(&self, column: ColumnRef<'_>) -> Result<Value> {
        let index = self.position(column)?;
        let Some(row) = &self.current else {
            return Err(Error::invalid_argument("cursor is not positioned on a row"));
        };

        Ok(row.get(index).cloned().unwrap_or_default())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.rows.clear();
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_cursor_walks_rows() {
        let mut cursor = BufferedCursor::new(
            vec!["ID".into(), "NAME".into()],
            vec![
                vec![Value::I64(1), Value::from("Alice")],
                vec![Value::I64(2), Value::from("Bob")],
            ],
        );

        assert!(cursor.next().unwrap());
        assert_eq!(cursor.get(ColumnRef::Index(0)).unwrap(), Value::I64(1));
        assert!(cursor.next().unwrap());
        assert_eq!(cursor.get("name".into()).unwrap(), Value::from("Bob"));
        assert!(!cursor.next().unwrap());
    }

    #[test]
    fn closed_cursor_is_exhausted() {
        let mut cursor = BufferedCursor::new(vec!["ID".into()], vec![vec![Value::I64(1)]]);

        cursor.close().unwrap();
        assert!(cursor.is_closed());
        assert!(!cursor.next().unwrap());
    }
}
