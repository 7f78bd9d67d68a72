//! Derive macros for `onlydata`.
//!
//! This crate generates the self-describing capability behind
//! `#[derive(DataView)]`. It:
//! - reads `#[data_view(...)]` field attributes
//! - emits an `onlydata::DataView` implementation that serializes each kept
//!   field with `serde_json::to_value`
//!
//! It does **not** define the `DataView` trait or the traversal engine. Those
//! live in the main `onlydata` crate.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::redundant_pub_crate
)]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DataStruct, DeriveInput, Fields, Result, parse_macro_input, spanned::Spanned};

mod fields;
use fields::parse_field_options;

/// Derives `onlydata::DataView` for structs with named fields.
///
/// The generated `data_view` serializes each field with
/// `serde_json::to_value`, keyed by the field name, in declaration order.
/// Every kept field must implement `serde::Serialize`; values that fail to
/// serialize become `null` rather than aborting the view.
///
/// # Field Attributes
///
/// - `#[data_view(skip)]` - Omit the field from the data view. Use this for
///   payloads that are not data (callbacks, handles) or must not leak.
///
/// - `#[data_view(rename = "key")]` - Emit the field under `key` instead of
///   its Rust name.
///
/// Enums, unions, and tuple structs are rejected at compile time.
///
/// # Example
///
/// ```ignore
/// #[derive(DataView)]
/// struct Session {
///     user: String,
///     #[data_view(rename = "startedAt")]
///     started_at: u64,
///     #[data_view(skip)]
///     transport: Transport,
/// }
/// ```
#[proc_macro_derive(DataView, attributes(data_view))]
pub fn derive_data_view(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_data_view(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand_data_view(input: &DeriveInput) -> Result<TokenStream> {
    let named = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(named),
            ..
        }) => &named.named,
        Data::Struct(_) => {
            return Err(syn::Error::new(
                input.span(),
                "DataView can only be derived for structs with named fields",
            ));
        }
        Data::Enum(_) => {
            return Err(syn::Error::new(
                input.span(),
                "DataView cannot be derived for enums",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new(
                input.span(),
                "DataView cannot be derived for unions",
            ));
        }
    };

    let krate = resolve_crate();
    let mut inserts = Vec::with_capacity(named.len());

    for field in named {
        let options = parse_field_options(field)?;
        if options.skip {
            continue;
        }

        let Some(ident) = &field.ident else {
            return Err(syn::Error::new(field.span(), "expected a named field"));
        };
        let key = options.rename.unwrap_or_else(|| ident.to_string());

        inserts.push(quote! {
            view.insert(
                #key.to_owned(),
                #krate::serde_json::to_value(&self.#ident)
                    .unwrap_or(#krate::serde_json::Value::Null),
            );
        });
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #krate::DataView for #name #ty_generics #where_clause {
            fn data_view(&self) -> #krate::serde_json::Value {
                let mut view = #krate::serde_json::Map::new();
                #(#inserts)*
                #krate::serde_json::Value::Object(view)
            }
        }
    })
}

/// Returns the token stream to reference the onlydata crate root.
///
/// Handles crate renaming (e.g., `my_data = { package = "onlydata", ... }`).
fn resolve_crate() -> TokenStream {
    match crate_name("onlydata") {
        Ok(FoundCrate::Itself) => quote! { crate },
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Err(_) => quote! { ::onlydata },
    }
}
