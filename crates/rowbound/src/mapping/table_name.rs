use rowbound_core::{
    name::Canonicalizer,
    schema::{DbMetadata, TableMetadata},
    Error, Result,
};

/// Table names tried for a type with no table marker, most likely first.
pub(crate) fn candidates(type_name: &str) -> Vec<String> {
    let mut out = vec![type_name.to_string()];

    let mut push = |name: String| {
        if !out.contains(&name) {
            out.push(name);
        }
    };

    push(pluralizer::pluralize(type_name, 2, false));
    push(format!("{type_name}s"));
    push(format!("{type_name}es"));

    if let Some(stem) = type_name
        .strip_suffix('y')
        .or_else(|| type_name.strip_suffix('Y'))
    {
        push(format!("{stem}ies"));
    }

    out
}

/// Finds the table a type maps to.
///
/// An explicit marker must name an existing table. Otherwise the first
/// candidate derived from the type name that matches a table canonically
/// wins.
pub(crate) fn find_table<'a>(
    metadata: &'a DbMetadata,
    type_name: &str,
    marker: Option<&str>,
    names: &Canonicalizer,
) -> Result<&'a TableMetadata> {
    let tried = match marker {
        Some(marker) => vec![marker.to_string()],
        None => candidates(type_name),
    };

    for candidate in &tried {
        if let Some(table) = metadata.table(candidate) {
            return Ok(table);
        }

        let canonical = names.canonicalize(candidate);
        if let Some(table) = metadata
            .tables
            .iter()
            .find(|table| names.canonicalize(&table.name) == canonical)
        {
            return Ok(table);
        }
    }

    Err(Error::mapping(format!(
        "no table found for type `{type_name}`; tried {}",
        tried
            .iter()
            .map(|name| format!("`{name}`"))
            .collect::<Vec<_>>()
            .join(", ")
    )))
}
