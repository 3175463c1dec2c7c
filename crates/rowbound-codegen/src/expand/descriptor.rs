use super::Expand;
use crate::schema::Field;

use proc_macro2::TokenStream;
use quote::quote;

impl Expand<'_> {
    pub(super) fn expand_model_impl(&self) -> TokenStream {
        let rowbound = &self.rowbound;
        let model_ident = &self.model.ident;
        let type_name = model_ident.to_string();

        let table = self.model.attrs.table.as_ref().map(|table| {
            quote!(.table(#table))
        });

        let members = self.model.mapped_fields().map(|field| self.expand_member(field));
        let constructor = self.expand_constructor();

        quote! {
            impl #rowbound::Model for #model_ident {
                fn descriptor() -> #rowbound::TypeDescriptor<Self> {
                    #rowbound::TypeDescriptor::new(#type_name)
                        #table
                        #( .member(#members) )*
                        .constructor(#constructor)
                }
            }
        }
    }

    /// A field member reading and writing the struct field directly.
    fn expand_member(&self, field: &Field) -> TokenStream {
        let rowbound = &self.rowbound;
        let ident = &field.ident;
        let ty = &field.ty;
        let name = ident.to_string();

        let column = field.attrs.column.as_ref().map(|column| {
            let name = &column.name;
            quote!(.column(#name))
        });

        quote! {
            #rowbound::Member::field(
                #name,
                |obj: &Self| #rowbound::Primitive::to_value(&obj.#ident),
                |obj: &mut Self, value: #rowbound::Value| {
                    obj.#ident = <#ty as #rowbound::Primitive>::load(value)?;
                    #rowbound::Result::Ok(())
                },
            )
            #column
        }
    }

    /// A constructor taking every mapped field in declaration order.
    /// Skipped fields are filled with `Default::default()`.
    fn expand_constructor(&self) -> TokenStream {
        let rowbound = &self.rowbound;

        let params = self.model.mapped_fields().map(|field| {
            let ty = &field.ty;
            let name = field.mapped_name();

            quote! {
                if <#ty as #rowbound::Primitive>::NULLABLE {
                    #rowbound::CtorParam::optional(#name)
                } else {
                    #rowbound::CtorParam::required(#name)
                }
            }
        });

        let inits = self.model.fields.iter().map(|field| {
            let ident = &field.ident;
            let ty = &field.ty;

            if field.attrs.skip {
                quote!(#ident: #rowbound::Default::default())
            } else {
                quote! {
                    #ident: <#ty as #rowbound::Primitive>::load(
                        args.next().unwrap_or_default()
                    )?
                }
            }
        });

        quote! {
            #rowbound::Constructor::new(
                [ #( #params ),* ],
                |args: #rowbound::Vec<#rowbound::Value>| {
                    let mut args = args.into_iter();
                    #rowbound::Result::Ok(Self {
                        #( #inits ),*
                    })
                },
            )
        }
    }
}
