use rowbound_core::{Error, Result};

/// Splits joined-query columns between tuple members by label prefix.
///
/// Returns, per prefix, the matching cursor columns with the prefix
/// stripped from their labels. Prefixes compare case-insensitively and must
/// not be prefixes of one another. Columns matching no prefix are dropped.
pub(crate) fn partition(columns: &[String], prefixes: &[&str]) -> Result<Vec<Vec<(usize, String)>>> {
    for (i, a) in prefixes.iter().enumerate() {
        for b in &prefixes[i + 1..] {
            if starts_with_ignore_case(a, b) || starts_with_ignore_case(b, a) {
                return Err(Error::invalid_argument(format!(
                    "column prefixes `{a}` and `{b}` overlap"
                )));
            }
        }
    }

    let mut parts = vec![vec![]; prefixes.len()];

    for (index, label) in columns.iter().enumerate() {
        let matched = prefixes
            .iter()
            .position(|prefix| starts_with_ignore_case(label, prefix));

        if let Some(part) = matched {
            let stripped = &label[prefixes[part].len()..];
            parts[part].push((index, stripped.to_string()));
        }
    }

    Ok(parts)
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
