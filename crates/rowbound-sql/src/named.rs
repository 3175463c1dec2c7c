//! Named parameters such as `:id`.

use crate::{
    ordered::expand_list,
    scan::{self, Segment},
    ParameterizedSql,
};

use indexmap::IndexMap;
use rowbound_core::{stmt::Value, Error, Result};
use serde::Deserialize;
use std::{collections::HashMap, hash::BuildHasher};

/// The syntax of a named placeholder: `<prefix><identifier><suffix>`.
///
/// Identifiers are maximal runs of ASCII letters, digits and `_`, so `:id`
/// never matches inside `:id2`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamedPlaceholder {
    pub prefix: String,
    pub suffix: String,
}

impl Default for NamedPlaceholder {
    fn default() -> Self {
        NamedPlaceholder {
            prefix: ":".to_string(),
            suffix: String::new(),
        }
    }
}

impl NamedPlaceholder {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> NamedPlaceholder {
        NamedPlaceholder {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(Error::invalid_argument(
                "named placeholder prefix must not be empty",
            ));
        }
        Ok(())
    }
}

/// Supplies values for placeholders that were not bound explicitly.
pub trait ParameterSource {
    /// Looks up a value by placeholder name, without prefix or suffix.
    fn parameter(&self, name: &str) -> Option<Value>;
}

impl<S: BuildHasher> ParameterSource for HashMap<String, Value, S> {
    fn parameter(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl ParameterSource for IndexMap<String, Value> {
    fn parameter(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<P: ParameterSource + ?Sized> ParameterSource for &P {
    fn parameter(&self, name: &str) -> Option<Value> {
        (**self).parameter(name)
    }
}

/// SQL with named placeholders.
///
/// Each placeholder occurrence is resolved from the explicitly bound values
/// first (exact name) and then from the bound [`ParameterSource`]. Resolved
/// occurrences become `?` markers with their values appended in textual
/// order; an occurrence bound twice binds its value twice. Unresolved
/// occurrences are left in the SQL unchanged, unless parsed strictly.
///
/// `<:ids>` bound to a list expands to one marker per element.
#[derive(Clone)]
pub struct NamedParameterSql<'a> {
    sql: String,
    placeholder: NamedPlaceholder,
    params: IndexMap<String, Value>,
    source: Option<&'a dyn ParameterSource>,
}

impl<'a> NamedParameterSql<'a> {
    pub fn new(sql: impl Into<String>) -> NamedParameterSql<'a> {
        NamedParameterSql {
            sql: sql.into(),
            placeholder: NamedPlaceholder::default(),
            params: IndexMap::new(),
            source: None,
        }
    }

    pub fn placeholder(mut self, placeholder: NamedPlaceholder) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn bind_all<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Falls back to `source` for names not bound explicitly.
    pub fn bind_source(mut self, source: &'a dyn ParameterSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parses, leaving unresolved placeholders in place.
    pub fn parse(&self) -> Result<ParameterizedSql> {
        self.placeholder.validate()?;
        Ok(self.compile()?.0)
    }

    /// Parses, failing if any placeholder is left unresolved.
    pub fn parse_strict(&self) -> Result<ParameterizedSql> {
        self.placeholder.validate()?;
        let (sql, unbound) = self.compile()?;

        if !unbound.is_empty() {
            return Err(Error::unbound_parameter(unbound));
        }

        Ok(sql)
    }

    /// Fails naming every placeholder that has no value.
    pub fn ensure_fully_bound(&self) -> Result<()> {
        self.parse_strict().map(drop)
    }

    /// Placeholders (with prefix and suffix) that have no value, in textual
    /// order.
    pub fn unbound_parameters(&self) -> Result<Vec<String>> {
        self.placeholder.validate()?;
        Ok(self.expand()?.2)
    }

    fn resolve(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.params.get(name) {
            return Some(value.clone());
        }

        self.source.and_then(|source| source.parameter(name))
    }

    fn compile(&self) -> Result<(ParameterizedSql, Vec<String>)> {
        let (out, params, unbound) = self.expand()?;

        // Markers already present in the text need values too.
        let markers = scan::count_markers(&out);
        if markers != params.len() {
            return Err(Error::binding(markers, params.len()));
        }

        Ok((ParameterizedSql::from_parts(out, params), unbound))
    }

    /// Replaces resolved placeholders with markers. Returns the rewritten
    /// SQL, the values in marker order and the unresolved placeholders.
    fn expand(&self) -> Result<(String, Vec<Value>, Vec<String>)> {
        let NamedPlaceholder { prefix, suffix } = &self.placeholder;
        let mut out = String::with_capacity(self.sql.len());
        let mut params = vec![];
        let mut unbound = vec![];

        for segment in scan::segments(&self.sql) {
            let code = match segment {
                Segment::Verbatim(text) => {
                    out.push_str(text);
                    continue;
                }
                Segment::Code(code) => code,
            };

            let mut rest = code;
            while let Some(i) = rest.find(prefix.as_str()) {
                let after = &rest[i + prefix.len()..];

                // A doubled prefix, such as a `::int` cast, is never a placeholder.
                if after.starts_with(prefix.as_str()) {
                    out.push_str(&rest[..i + 2 * prefix.len()]);
                    rest = &after[prefix.len()..];
                    continue;
                }

                let ident_len = after
                    .bytes()
                    .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                    .count();

                if ident_len == 0 || !after[ident_len..].starts_with(suffix.as_str()) {
                    out.push_str(&rest[..i + prefix.len()]);
                    rest = after;
                    continue;
                }

                let name = &after[..ident_len];
                let end = i + prefix.len() + ident_len + suffix.len();
                let list = rest[..i].ends_with('<') && rest[end..].starts_with('>');

                let Some(value) = self.resolve(name) else {
                    unbound.push(rest[i..end].to_string());
                    out.push_str(&rest[..end]);
                    rest = &rest[end..];
                    continue;
                };

                if list {
                    out.push_str(&rest[..i - 1]);
                    rest = &rest[end + 1..];

                    let items = match value {
                        Value::List(items) => items,
                        _ => return Err(Error::binding_not_a_list(params.len())),
                    };
                    expand_list(&mut out, &mut params, items);
                } else {
                    out.push_str(&rest[..i]);
                    out.push('?');
                    params.push(value);
                    rest = &rest[end..];
                }
            }
            out.push_str(rest);
        }

        Ok((out, params, unbound))
    }
}

/// Fails if `sql` still contains placeholders of the given syntax.
///
/// Use on the output of a lenient [`NamedParameterSql::parse`] once the
/// caller knows every placeholder should have been resolved.
pub fn ensure_fully_bound(sql: &ParameterizedSql, placeholder: &NamedPlaceholder) -> Result<()> {
    let unbound = NamedParameterSql::new(sql.sql())
        .placeholder(placeholder.clone())
        .unbound_parameters()?;

    if !unbound.is_empty() {
        return Err(Error::unbound_parameter(unbound));
    }
    Ok(())
}

impl std::fmt::Debug for NamedParameterSql<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedParameterSql")
            .field("sql", &self.sql)
            .field("placeholder", &self.placeholder)
            .field("params", &self.params)
            .field("source", &self.source.is_some())
            .finish()
    }
}
