use crate::{
    literal::Literal,
    scan::{self, Segment},
    NamedParameterSql, OrderedParameterSql,
};

use rowbound_core::{stmt::Value, Result};
use std::fmt;

/// SQL with positional `?` markers and the values bound to them, in order.
///
/// The number of markers outside literals and comments always equals the
/// number of values.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedSql {
    sql: String,
    params: Vec<Value>,
}

impl ParameterizedSql {
    /// Binds `params` to the `?` markers of `sql`, expanding `<?>` list
    /// markers.
    ///
    /// Fails with a binding error when the counts differ.
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Result<ParameterizedSql> {
        OrderedParameterSql::new(sql).add_all(params).parse()
    }

    /// SQL without parameters.
    pub fn from_sql(sql: impl Into<String>) -> Result<ParameterizedSql> {
        ParameterizedSql::new(sql, vec![])
    }

    /// Callers guarantee the marker count matches.
    pub(crate) fn from_parts(sql: String, params: Vec<Value>) -> ParameterizedSql {
        ParameterizedSql { sql, params }
    }

    /// Number of `?` markers outside literals and comments.
    pub fn marker_count(&self) -> usize {
        scan::count_markers(&self.sql)
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    /// The statement with every marker replaced by its value rendered as a
    /// literal. Intended for logs.
    pub fn executable_sql(&self) -> String {
        let mut out = String::with_capacity(self.sql.len());
        let mut params = self.params.iter();

        for segment in scan::segments(&self.sql) {
            match segment {
                Segment::Verbatim(text) => out.push_str(text),
                Segment::Code(code) => {
                    let mut rest = code;
                    while let Some(i) = rest.find('?') {
                        out.push_str(&rest[..i]);
                        match params.next() {
                            Some(value) => out.push_str(&Literal(value).to_string()),
                            None => out.push('?'),
                        }
                        rest = &rest[i + 1..];
                    }
                    out.push_str(rest);
                }
            }
        }

        out
    }
}

impl fmt::Display for ParameterizedSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Anything that can become a [`ParameterizedSql`].
pub trait IntoParameterizedSql {
    fn into_parameterized_sql(self) -> Result<ParameterizedSql>;
}

impl IntoParameterizedSql for ParameterizedSql {
    fn into_parameterized_sql(self) -> Result<ParameterizedSql> {
        Ok(self)
    }
}

impl IntoParameterizedSql for &ParameterizedSql {
    fn into_parameterized_sql(self) -> Result<ParameterizedSql> {
        Ok(self.clone())
    }
}

impl IntoParameterizedSql for &str {
    fn into_parameterized_sql(self) -> Result<ParameterizedSql> {
        ParameterizedSql::from_sql(self)
    }
}

impl IntoParameterizedSql for String {
    fn into_parameterized_sql(self) -> Result<ParameterizedSql> {
        ParameterizedSql::from_sql(self)
    }
}

impl<S: Into<String>> IntoParameterizedSql for (S, Vec<Value>) {
    fn into_parameterized_sql(self) -> Result<ParameterizedSql> {
        ParameterizedSql::new(self.0, self.1)
    }
}

impl<S: Into<String>> IntoParameterizedSql for (S, &[Value]) {
    fn into_parameterized_sql(self) -> Result<ParameterizedSql> {
        ParameterizedSql::new(self.0, self.1.to_vec())
    }
}

impl IntoParameterizedSql for OrderedParameterSql {
    fn into_parameterized_sql(self) -> Result<ParameterizedSql> {
        self.parse()
    }
}

impl IntoParameterizedSql for NamedParameterSql<'_> {
    fn into_parameterized_sql(self) -> Result<ParameterizedSql> {
        self.parse()
    }
}

impl IntoParameterizedSql for &NamedParameterSql<'_> {
    fn into_parameterized_sql(self) -> Result<ParameterizedSql> {
        self.parse()
    }
}
