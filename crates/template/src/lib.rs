use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Meta, parse_macro_input};

/// Adds `fn render(&self) -> Result<String, tinytemplate::error::Error>` backed
/// by the file named in `#[template(path = "...")]`.
#[proc_macro_derive(Template, attributes(template))]
pub fn derive_template(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let Some(template_path) = template_path(&input) else {
        return syn::Error::new_spanned(
            name,
            "#[derive(Template)] needs #[template(path = \"...\")]",
        )
        .to_compile_error()
        .into();
    };

    let template_const_name = syn::Ident::new(
        &format!("{}_TEMPLATE", name.to_string().to_uppercase()),
        name.span(),
    );

    let expanded = quote! {
        const #template_const_name: &str = include_str!(#template_path);

        impl #name {
            fn render(&self) -> ::std::result::Result<String, ::tinytemplate::error::Error> {
                let mut tt = ::tinytemplate::TinyTemplate::new();
                tt.set_default_formatter(&::tinytemplate::format_unescaped);
                tt.add_template(stringify!(#name), #template_const_name)?;
                tt.render(stringify!(#name), &self)
            }
        }
    };

    TokenStream::from(expanded)
}

fn template_path(input: &DeriveInput) -> Option<String> {
    let attr = input
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("template"))?;
    let Meta::List(meta_list) = &attr.meta else {
        return None;
    };
    let nv = syn::parse2::<syn::MetaNameValue>(meta_list.tokens.clone()).ok()?;
    if !nv.path.is_ident("path") {
        return None;
    }
    match nv.value {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit_str),
            ..
        }) => Some(lit_str.value()),
        _ => None,
    }
}
