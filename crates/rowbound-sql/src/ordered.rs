//! Positional `?` parameters.

use crate::{
    delim,
    scan::{self, Segment},
    ParameterizedSql,
};

use rowbound_core::{stmt::Value, Error, Result};

/// Builds a [`ParameterizedSql`] from SQL with `?` markers and values added
/// in marker order.
///
/// A `<?>` marker takes a [`Value::List`] and expands to one `?` per element,
/// which suits `IN (<?>)` clauses. An empty list renders as `NULL`.
#[derive(Debug, Clone, Default)]
pub struct OrderedParameterSql {
    sql: String,
    params: Vec<Value>,
}

impl OrderedParameterSql {
    pub fn new(sql: impl Into<String>) -> OrderedParameterSql {
        OrderedParameterSql {
            sql: sql.into(),
            params: vec![],
        }
    }

    pub fn add(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn add_all<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.params.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn parse(self) -> Result<ParameterizedSql> {
        let supplied = self.params.len();
        let mut values = self.params.into_iter();
        let mut out = String::with_capacity(self.sql.len());
        let mut params = Vec::with_capacity(supplied);
        let mut markers = 0;

        for segment in scan::segments(&self.sql) {
            let code = match segment {
                Segment::Verbatim(text) => {
                    out.push_str(text);
                    continue;
                }
                Segment::Code(code) => code,
            };

            let mut rest = code;
            while let Some(i) = rest.find('?') {
                let list = rest[..i].ends_with('<') && rest[i + 1..].starts_with('>');
                let position = markers;
                markers += 1;

                if list {
                    out.push_str(&rest[..i - 1]);
                    rest = &rest[i + 2..];
                } else {
                    out.push_str(&rest[..i]);
                    rest = &rest[i + 1..];
                }

                let Some(value) = values.next() else {
                    // Keep counting so the error reports the full marker count.
                    continue;
                };

                if list {
                    let items = match value {
                        Value::List(items) => items,
                        _ => return Err(Error::binding_not_a_list(position)),
                    };
                    expand_list(&mut out, &mut params, items);
                } else {
                    out.push('?');
                    params.push(value);
                }
            }
            out.push_str(rest);
        }

        if markers != supplied {
            return Err(Error::binding(markers, supplied));
        }

        Ok(ParameterizedSql::from_parts(out, params))
    }
}

pub(crate) fn expand_list(out: &mut String, params: &mut Vec<Value>, items: Vec<Value>) {
    use std::fmt::Write;

    if items.is_empty() {
        out.push_str("NULL");
    } else {
        // Writing into a `String` cannot fail.
        let _ = write!(out, "{}", delim::markers(items.len()));
        params.extend(items);
    }
}
