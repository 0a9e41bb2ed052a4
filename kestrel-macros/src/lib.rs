//! `#[derive(Tagged)]`: assign each variant of a plain enum a stable,
//! zero-based `i32` tag and implement `kestrel::message::Tagged` for it.
//!
//! Scaled down to the one thing THE CORE actually needs a macro for:
//! turning a user's message enum into the plain `(payload, tag)` pairs
//! `Message::new` expects, without hand-assigning tag numbers that could
//! drift out of sync with a `match` elsewhere in the same actor.
//!
//! ```ignore
//! #[derive(Tagged)]
//! enum Ping {
//!     Ping,
//!     Pong(u32),
//! }
//! // expands to `impl Tagged for Ping` plus `Ping::PING_TAG` / `Ping::PONG_TAG`.
//! ```

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields};

#[proc_macro_derive(Tagged)]
pub fn derive_tagged(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return syn::Error::new_spanned(&input, "Tagged can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let mut arms = Vec::with_capacity(variants.len());
    let mut consts = Vec::with_capacity(variants.len());

    for (index, variant) in variants.iter().enumerate() {
        let variant_ident = &variant.ident;
        let tag = index as i32;

        let pattern = match &variant.fields {
            Fields::Unit => quote!(#name::#variant_ident),
            Fields::Unnamed(_) => quote!(#name::#variant_ident(..)),
            Fields::Named(_) => quote!(#name::#variant_ident { .. }),
        };
        arms.push(quote!(#pattern => #tag,));

        let const_ident = format_ident!(
            "{}_TAG",
            variant_ident.to_string().to_ascii_uppercase()
        );
        consts.push(quote!(pub const #const_ident: i32 = #tag;));
    }

    let expanded = quote! {
        impl #name {
            #(#consts)*
        }

        impl ::kestrel::message::Tagged for #name {
            fn tag(&self) -> i32 {
                match self {
                    #(#arms)*
                }
            }
        }
    };

    expanded.into()
}
