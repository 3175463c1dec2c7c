use super::ResolvedType;

use rowbound_core::{name::Canonicalizer, stmt::Value};
use rowbound_sql::ParameterSource;

use std::sync::Arc;

/// Exposes the readable members of an object as named parameters.
///
/// Placeholder names are matched canonically, so `:user_id` reads a member
/// named `userId`.
pub struct ObjectParameters<'a, T> {
    obj: &'a T,
    resolved: Arc<ResolvedType<T>>,
    names: &'a Canonicalizer,
}

impl<'a, T> ObjectParameters<'a, T> {
    pub(crate) fn new(
        obj: &'a T,
        resolved: Arc<ResolvedType<T>>,
        names: &'a Canonicalizer,
    ) -> ObjectParameters<'a, T> {
        ObjectParameters {
            obj,
            resolved,
            names,
        }
    }
}

impl<T> ParameterSource for ObjectParameters<'_, T> {
    fn parameter(&self, name: &str) -> Option<Value> {
        let name = self.names.canonicalize(name);
        let accessor = self.resolved.accessor(&name)?;

        if !accessor.is_readable() {
            return None;
        }

        accessor.get(self.obj, &name).ok()
    }
}

impl<T> std::fmt::Debug for ObjectParameters<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectParameters")
            .field("type_name", &self.resolved.type_name())
            .finish()
    }
}
