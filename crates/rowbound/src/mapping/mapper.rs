use super::{resolve::Creation, ResolvedType, RowView};

use rowbound_core::{name::Canonicalizer, stmt::Value, Error, Result};

use std::sync::Arc;

/// Maps cursor rows to instances of `T`.
///
/// The column plan is computed from the first row's labels and reused for
/// every later row of the same cursor.
pub(crate) struct RowMapper<'a, T> {
    resolved: Arc<ResolvedType<T>>,
    names: &'a Canonicalizer,

    /// Cursor columns to consider, with the labels to match them by. All
    /// columns under their own labels when unset.
    columns: Option<Vec<(usize, String)>>,

    plan: Option<Plan>,
}

struct Plan {
    /// Constructor arguments: cursor column and call position
    args: Vec<(usize, usize)>,

    /// Setters: cursor column, accessor index and column label
    setters: Vec<(usize, usize, String)>,

    arity: usize,
}

impl<'a, T> RowMapper<'a, T> {
    pub(crate) fn new(resolved: Arc<ResolvedType<T>>, names: &'a Canonicalizer) -> Self {
        RowMapper {
            resolved,
            names,
            columns: None,
            plan: None,
        }
    }

    /// Maps only `columns`, matching each by the given label.
    pub(crate) fn with_columns(
        resolved: Arc<ResolvedType<T>>,
        names: &'a Canonicalizer,
        columns: Vec<(usize, String)>,
    ) -> Self {
        RowMapper {
            columns: Some(columns),
            ..RowMapper::new(resolved, names)
        }
    }

    pub(crate) fn load(&mut self, row: &RowView<'_>) -> Result<T> {
        let plan = match self.plan.take() {
            Some(plan) => plan,
            None => self.plan(row)?,
        };

        let result = self.apply(&plan, row);
        self.plan = Some(plan);
        result
    }

    fn apply(&self, plan: &Plan, row: &RowView<'_>) -> Result<T> {
        let mut obj = match self.resolved.creation() {
            Creation::Constructor { build, .. } => {
                let mut args = vec![Value::Null; plan.arity];
                for &(column, position) in &plan.args {
                    args[position] = row.get(column)?;
                }
                build(args).map_err(|err| {
                    err.context(Error::mapping(format!(
                        "cannot construct `{}`",
                        self.resolved.type_name()
                    )))
                })?
            }
            Creation::Instantiate(instantiate) => instantiate(),
        };

        for (column, accessor, label) in &plan.setters {
            let Some((name, accessor)) = self.resolved.accessor_at(*accessor) else {
                continue;
            };

            accessor
                .set(&mut obj, row.get(*column)?, name)
                .map_err(|err| {
                    err.context(Error::mapping(format!(
                        "cannot map column `{label}` to `{}`",
                        self.resolved.type_name()
                    )))
                })?;
        }

        Ok(obj)
    }

    fn plan(&self, row: &RowView<'_>) -> Result<Plan> {
        let columns: Vec<(usize, &str)> = match &self.columns {
            Some(columns) => columns
                .iter()
                .map(|(index, label)| (*index, label.as_str()))
                .collect(),
            None => row
                .column_names()
                .iter()
                .enumerate()
                .map(|(index, label)| (index, label.as_str()))
                .collect(),
        };

        let mut args = vec![];
        let mut setters = vec![];
        let mut assigned = vec![false; self.resolved.len()];

        let (params, positions) = match self.resolved.creation() {
            Creation::Constructor {
                params, positions, ..
            } => (&params[..], Some(positions)),
            Creation::Instantiate(_) => (&[][..], None),
        };
        let mut filled = vec![false; params.len()];

        for (column, label) in columns {
            let name = self.names.canonicalize(label);

            if let Some(&position) = positions.and_then(|positions| positions.get(&name)) {
                if !filled[position] {
                    filled[position] = true;
                    args.push((column, position));
                }
                continue;
            }

            let Some(index) = self.resolved.accessor_index(&name) else {
                continue;
            };

            let writable = self
                .resolved
                .accessor_at(index)
                .is_some_and(|(_, accessor)| accessor.is_writable());

            if writable && !assigned[index] {
                assigned[index] = true;
                setters.push((column, index, label.to_string()));
            }
        }

        let missing: Vec<_> = params
            .iter()
            .zip(&filled)
            .filter(|(param, filled)| param.required && !**filled)
            .map(|(param, _)| param.name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(Error::mapping(format!(
                "no column for required constructor parameter(s) of `{}`: {}",
                self.resolved.type_name(),
                missing.join(", ")
            )));
        }

        Ok(Plan {
            args,
            setters,
            arity: params.len(),
        })
    }
}
