//! Derive macros for the `Record` and `Expansion` traits.
//!
//! A response struct describes its own selection: plain fields become the
//! projected field list, and the field marked `#[record(expand)]` names the
//! relations to expand. The struct the response deserializes into is
//! therefore exactly the shape the compiled query asks for.
//!
//! # Usage
//!
//! ```ignore
//! use pbselect_sdk::{Expansion, Record};
//!
//! #[derive(Deserialize, Record)]
//! #[record(collection = "posts")]
//! struct Post {
//!     title: String,
//!     #[record(expand)]
//!     expand: PostExpand,
//! }
//!
//! #[derive(Deserialize, Expansion)]
//! struct PostExpand {
//!     author: Author,
//!     #[record(rename = "post(postId)")]
//!     #[serde(rename = "post(postId)")]
//!     comments: Vec<Comment>,
//! }
//! ```
//!
//! `Post::selection()` is `{ key: "posts", fields: ["title"], expand: [author, post(postId)] }`.

use heck::ToSnakeCase;
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, LitStr, Type};

/// Options from `#[record(...)]` on a field.
#[derive(Default)]
struct FieldOpts {
    rename: Option<String>,
    expand: bool,
    skip: bool,
}

/// Options from `#[record(...)]` on the struct.
#[derive(Default)]
struct ContainerOpts {
    collection: Option<String>,
    all_fields: bool,
}

fn named_fields(input: &DeriveInput, derive: &str) -> syn::Result<Punctuated<Field, Comma>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => Ok(named.named.clone()),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{} can only be derived on structs with named fields", derive),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{} can only be derived on structs", derive),
        )),
    }
}

fn field_opts(field: &Field) -> syn::Result<FieldOpts> {
    let mut opts = FieldOpts::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                opts.rename = Some(lit.value());
            } else if meta.path.is_ident("expand") {
                opts.expand = true;
            } else if meta.path.is_ident("skip") {
                opts.skip = true;
            } else {
                return Err(meta.error("unknown record field attribute"));
            }
            Ok(())
        })?;
    }
    Ok(opts)
}

fn container_opts(input: &DeriveInput) -> syn::Result<ContainerOpts> {
    let mut opts = ContainerOpts::default();
    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let lit: LitStr = meta.value()?.parse()?;
                opts.collection = Some(lit.value());
            } else if meta.path.is_ident("all_fields") {
                opts.all_fields = true;
            } else {
                return Err(meta.error("unknown record container attribute"));
            }
            Ok(())
        })?;
    }
    Ok(opts)
}

/// Wire name of a field: the `rename` override, or the identifier with any
/// raw prefix (`r#type` → `type`) removed.
fn wire_name(field: &Field, opts: &FieldOpts) -> String {
    if let Some(name) = &opts.rename {
        return name.clone();
    }
    let ident = field
        .ident
        .as_ref()
        .map(|i| i.to_string())
        .unwrap_or_default();
    ident.strip_prefix("r#").unwrap_or(&ident).to_string()
}

/// Derive `Record` for a struct.
///
/// - Plain fields → projected field names
/// - `#[record(expand)]` field → relations from its type's `Expansion` impl
/// - `#[record(skip)]` fields are left out of the projection
/// - `#[record(all_fields)]` on the struct → no projection at all
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let container = container_opts(input)?;
    let fields = named_fields(input, "Record")?;

    let collection = container
        .collection
        .unwrap_or_else(|| name.to_string().to_snake_case());

    let mut projected = Vec::new();
    let mut expand_ty: Option<&Type> = None;

    for field in &fields {
        let opts = field_opts(field)?;
        if opts.expand {
            if expand_ty.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be marked #[record(expand)]",
                ));
            }
            expand_ty = Some(unwrap_type(&field.ty));
        } else if !opts.skip {
            projected.push(wire_name(field, &opts));
        }
    }

    let fields_body = if container.all_fields {
        quote! { ::std::option::Option::None }
    } else {
        quote! {
            ::std::option::Option::Some(::std::vec![
                #(::std::string::String::from(#projected)),*
            ])
        }
    };

    let expand_body = match expand_ty {
        Some(ty) => quote! { <#ty as ::pbselect_sdk::Expansion>::children() },
        None => quote! { ::std::vec::Vec::new() },
    };

    let collection = LitStr::new(&collection, Span::call_site());

    Ok(quote! {
        impl ::pbselect_sdk::Record for #name {
            const COLLECTION: &'static str = #collection;

            fn fields() -> ::std::option::Option<::std::vec::Vec<::std::string::String>> {
                #fields_body
            }

            fn expand() -> ::std::vec::Vec<::pbselect_sdk::SelectionNode> {
                #expand_body
            }
        }
    })
}

/// Derive `Expansion` for a struct.
///
/// Each field is one relation: the key is the field name (or
/// `#[record(rename = "...")]`), and the child selection comes from the
/// field's record type after unwrapping `Option`, `Vec` and `Box`.
#[proc_macro_derive(Expansion, attributes(record))]
pub fn derive_expansion(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_expansion(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_expansion(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let fields = named_fields(input, "Expansion")?;

    let mut children = Vec::new();
    for field in &fields {
        let opts = field_opts(field)?;
        if opts.skip {
            continue;
        }
        let key = wire_name(field, &opts);
        let inner = unwrap_type(&field.ty);
        children.push(quote! {
            <#inner as ::pbselect_sdk::Record>::node(#key)
        });
    }

    Ok(quote! {
        impl ::pbselect_sdk::Expansion for #name {
            fn children() -> ::std::vec::Vec<::pbselect_sdk::SelectionNode> {
                ::std::vec![#(#children),*]
            }
        }
    })
}

/// Unwrap wrapper types to get the record type of a relation.
/// `Option<Box<Foo>>` → `Foo`, `Vec<Bar>` → `Bar`, `Option<Vec<Baz>>` → `Baz`, etc.
fn unwrap_type(ty: &Type) -> &Type {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            let ident = segment.ident.to_string();
            if ident == "Option" || ident == "Vec" || ident == "Box" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                        return unwrap_type(inner);
                    }
                }
            }
        }
    }
    ty
}
