extern crate proc_macro;

use proc_macro::TokenStream;

#[proc_macro_derive(Model, attributes(table, column, skip))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    match rowbound_codegen::generate(input.into()) {
        Ok(output) => output.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
