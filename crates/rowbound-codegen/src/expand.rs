mod descriptor;

use crate::schema::Model;

use proc_macro2::TokenStream;
use quote::quote;

struct Expand<'a> {
    /// The model being expanded
    model: &'a Model,

    /// Path prefix for rowbound types
    rowbound: TokenStream,
}

pub(super) fn model(model: &Model) -> TokenStream {
    let rowbound = quote!(_rowbound::codegen_support);

    let expand = Expand { model, rowbound };
    wrap_in_const(expand.expand_model_impl())
}

fn wrap_in_const(code: TokenStream) -> TokenStream {
    quote! {
        const _: () = {
            use rowbound as _rowbound;
            #code
        };
    }
}
