use super::{ErrorSet, Field, ModelAttr};

#[derive(Debug)]
pub(crate) struct Model {
    /// Model attributes
    pub(crate) attrs: ModelAttr,

    /// Struct identifier
    pub(crate) ident: syn::Ident,

    /// Fields in declaration order
    pub(crate) fields: Vec<Field>,
}

impl Model {
    pub(crate) fn from_ast(ast: &syn::ItemStruct) -> syn::Result<Model> {
        let syn::Fields::Named(node) = &ast.fields else {
            return Err(syn::Error::new_spanned(
                &ast.fields,
                "model fields must be named",
            ));
        };

        if !ast.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &ast.generics,
                "model structs cannot be generic",
            ));
        }

        let mut attrs = ModelAttr::default();
        attrs.populate_from_ast(&ast.attrs)?;

        let mut errs = ErrorSet::new();
        let mut fields = vec![];

        for node in &node.named {
            match Field::from_ast(node) {
                Ok(field) => fields.push(field),
                Err(err) => errs.push(err),
            }
        }

        if let Some(err) = errs.collect() {
            return Err(err);
        }

        if fields.iter().all(|field| field.attrs.skip) {
            return Err(syn::Error::new_spanned(
                &ast.ident,
                "model must have at least one mapped field",
            ));
        }

        Ok(Model {
            attrs,
            ident: ast.ident.clone(),
            fields,
        })
    }

    /// Fields that take part in mapping.
    pub(crate) fn mapped_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| !field.attrs.skip)
    }
}
