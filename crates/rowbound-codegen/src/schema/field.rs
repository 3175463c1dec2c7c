use super::{Column, ErrorSet};

#[derive(Debug)]
pub(crate) struct Field {
    /// Field attributes
    pub(crate) attrs: FieldAttr,

    /// Field identifier
    pub(crate) ident: syn::Ident,

    /// Field type
    pub(crate) ty: syn::Type,
}

#[derive(Debug, Default)]
pub(crate) struct FieldAttr {
    /// Optional database column name
    pub(crate) column: Option<Column>,

    /// True if the field is annotated with `#[skip]`
    pub(crate) skip: bool,
}

impl Field {
    pub(super) fn from_ast(field: &syn::Field) -> syn::Result<Self> {
        let Some(ident) = &field.ident else {
            return Err(syn::Error::new_spanned(field, "model fields must be named"));
        };

        let mut errs = ErrorSet::new();
        let mut attrs = FieldAttr::default();

        for attr in &field.attrs {
            if attr.path().is_ident("column") {
                if attrs.column.is_some() {
                    errs.push(syn::Error::new_spanned(attr, "duplicate #[column] attribute"));
                } else {
                    match Column::from_ast(attr) {
                        Ok(column) => attrs.column = Some(column),
                        Err(err) => errs.push(err),
                    }
                }
            } else if attr.path().is_ident("skip") {
                if attrs.skip {
                    errs.push(syn::Error::new_spanned(attr, "duplicate #[skip] attribute"));
                } else if let Err(err) = attr.meta.require_path_only() {
                    errs.push(err);
                } else {
                    attrs.skip = true;
                }
            }
        }

        if attrs.skip && attrs.column.is_some() {
            errs.push(syn::Error::new_spanned(
                field,
                "a skipped field cannot have a #[column] attribute",
            ));
        }

        if let Some(err) = errs.collect() {
            return Err(err);
        }

        Ok(Field {
            attrs,
            ident: ident.clone(),
            ty: field.ty.clone(),
        })
    }

    /// The name the field maps to.
    pub(crate) fn mapped_name(&self) -> String {
        match &self.attrs.column {
            Some(column) => column.name.value(),
            None => self.ident.to_string(),
        }
    }
}
