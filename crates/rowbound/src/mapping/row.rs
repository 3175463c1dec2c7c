use rowbound_core::{
    driver::{ColumnRef, RowCursor},
    name::{CanonicalName, Canonicalizer},
    stmt::{Primitive, Value},
    Result,
};

use indexmap::IndexMap;

/// A row keyed by canonical column name, in first-seen column order.
///
/// When two columns share a canonical name, the first one's value is kept.
pub type RowMap = IndexMap<CanonicalName, Value>;

/// The current row of a cursor.
///
/// Only valid for the duration of the callback it is passed to.
#[derive(Clone, Copy)]
pub struct RowView<'a> {
    cursor: &'a dyn RowCursor,
}

impl<'a> RowView<'a> {
    pub(crate) fn new(cursor: &'a dyn RowCursor) -> RowView<'a> {
        RowView { cursor }
    }

    /// Column labels in result order.
    pub fn column_names(&self) -> &'a [String] {
        self.cursor.column_names()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.column_names().len()
    }

    /// Reads a column by zero-based index or by label.
    pub fn get<'n>(&self, column: impl Into<ColumnRef<'n>>) -> Result<Value> {
        self.cursor.get(column.into())
    }

    /// Reads a column and converts it.
    pub fn get_as<'n, P: Primitive>(&self, column: impl Into<ColumnRef<'n>>) -> Result<P> {
        P::load(self.get(column)?)
    }

    pub(crate) fn to_map(&self, names: &Canonicalizer) -> Result<RowMap> {
        let columns = self.column_names();
        let mut map = RowMap::with_capacity(columns.len());

        for (index, label) in columns.iter().enumerate() {
            let name = names.canonicalize(label);

            if !map.contains_key(&name) {
                map.insert(name, self.get(index)?);
            }
        }

        Ok(map)
    }
}

impl std::fmt::Debug for RowView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowView")
            .field("columns", &self.column_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowbound_core::driver::BufferedCursor;

    #[test]
    fn first_duplicate_wins() {
        let mut cursor = BufferedCursor::new(
            vec!["id".into(), "NAME".into(), "ID".into()],
            vec![vec![Value::from(1), Value::from("a"), Value::from(2)]],
        );
        cursor.next().unwrap();

        let names = Canonicalizer::default();
        let map = RowView::new(&cursor).to_map(&names).unwrap();

        let keys: Vec<_> = map.keys().map(CanonicalName::as_str).collect();
        assert_eq!(keys, ["ID", "NAME"]);
        assert_eq!(map["ID"], Value::I32(1));
    }

    #[test]
    fn typed_access() {
        let mut cursor = BufferedCursor::new(
            vec!["ID".into(), "NAME".into()],
            vec![vec![Value::from(7_i64), Value::from("Bob")]],
        );
        cursor.next().unwrap();

        let row = RowView::new(&cursor);
        assert_eq!(row.width(), 2);
        assert_eq!(row.get_as::<i64>(0).unwrap(), 7);
        assert_eq!(row.get_as::<String>("name").unwrap(), "Bob");
    }
}
