//! Derive macro for querier records.
//!
//! This crate provides `#[derive(Record)]`, which generates the static field
//! descriptor table and the value bindings `querier-core` works from.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Type};

/// Tag name that excludes a field.
const IGNORE: &str = "-";

/// Derives `querier_core::Record` and `querier_core::FieldType` for a struct
/// with named fields.
///
/// # Field Attributes
///
/// - `#[db("name")]` - Sets the column name (defaults to the field name)
/// - `#[db(",TYPE")]` - Sets the SQL data type, bypassing the dialect
/// - `#[db("name,TYPE")]` - Both
/// - `#[db("-")]` - Excludes the field; its type needs no trait impls
///
/// Every other field type must implement `querier_core::FieldType`. A field
/// whose type is itself a derived record is flattened into the parent,
/// unless its tag sets a data type.
///
/// # Generated Items
///
/// - `impl Record`, with `FIELDS` in declaration order
/// - `impl FieldType`, so the struct can be nested in other records
#[proc_macro_derive(Record, attributes(db))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record derive does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Record derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Record derive only supports structs",
            ));
        }
    };

    let mut infos: Vec<FieldInfo> = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let tag = parse_db_tag(&field.attrs)?.unwrap_or_default();
        infos.push(FieldInfo {
            ignored: tag_name(&tag) == IGNORE,
            ident,
            ty: field.ty.clone(),
            tag,
        });
    }

    let descriptors: Vec<TokenStream2> = infos
        .iter()
        .map(|info| {
            let name = info.ident.unraw().to_string();
            let ty = &info.ty;
            let rust_type = quote!(#ty).to_string().replace(' ', "");
            let tag = &info.tag;
            let kind = if info.ignored {
                quote! { ::querier_core::FieldKind::Ignored }
            } else {
                quote! { <#ty as ::querier_core::FieldType>::KIND }
            };
            quote! {
                ::querier_core::FieldDescriptor::new(#name, #rust_type, #tag, #kind)
            }
        })
        .collect();

    let bound: Vec<(usize, &Ident)> = infos
        .iter()
        .enumerate()
        .filter(|(_, info)| !info.ignored)
        .map(|(index, info)| (index, &info.ident))
        .collect();
    let bound_idents: Vec<&Ident> = bound.iter().map(|(_, ident)| *ident).collect();
    let bindings: Vec<TokenStream2> = bound
        .iter()
        .map(|(index, ident)| {
            quote! {
                values.bind(&<Self as ::querier_core::Record>::FIELDS[#index], #ident);
            }
        })
        .collect();

    let expanded = quote! {
        impl ::querier_core::Record for #struct_name {
            const FIELDS: &'static [::querier_core::FieldDescriptor] = &[
                #(#descriptors),*
            ];

            #[allow(unused_variables)]
            fn bind_values<'__q>(
                &'__q mut self,
                values: &mut ::querier_core::ValueMap<'__q>,
            ) {
                let Self { #(#bound_idents,)* .. } = self;
                #(#bindings)*
            }
        }

        impl ::querier_core::FieldType for #struct_name {
            const KIND: ::querier_core::FieldKind = ::querier_core::FieldKind::Record(
                <Self as ::querier_core::Record>::FIELDS,
            );

            fn bind_value<'__q>(
                &'__q mut self,
                _name: &'static str,
                _values: &mut ::querier_core::ValueMap<'__q>,
            ) {
            }

            fn bind_inline<'__q>(&'__q mut self, values: &mut ::querier_core::ValueMap<'__q>) {
                ::querier_core::Record::bind_values(self, values);
            }
        }
    };

    Ok(expanded)
}

struct FieldInfo {
    ident: Ident,
    ty: Type,
    tag: String,
    ignored: bool,
}

/// Returns the name half of a tag.
fn tag_name(tag: &str) -> &str {
    tag.split_once(',').map_or(tag, |(name, _)| name)
}

fn parse_db_tag(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut tag = None;
    for attr in attrs {
        if !attr.path().is_ident("db") {
            continue;
        }
        if tag.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[db] attribute"));
        }
        let lit: LitStr = attr.parse_args()?;
        tag = Some(lit.value());
    }
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name() {
        assert_eq!(tag_name(""), "");
        assert_eq!(tag_name("-"), "-");
        assert_eq!(tag_name("-,INT"), "-");
        assert_eq!(tag_name(",INT"), "");
        assert_eq!(tag_name("user_id,DECIMAL(10,2)"), "user_id");
    }

    #[test]
    fn test_parse_db_tag() {
        let input: DeriveInput = syn::parse_quote! {
            struct S {
                #[db("name,TEXT")]
                #[allow(dead_code)]
                a: String,
            }
        };
        let Data::Struct(data) = input.data else {
            panic!("expected struct");
        };
        let field = data.fields.iter().next().unwrap();
        assert_eq!(parse_db_tag(&field.attrs).unwrap().as_deref(), Some("name,TEXT"));
    }

    #[test]
    fn test_rejects_tuple_struct() {
        let input: DeriveInput = syn::parse_quote! {
            struct Pair(i64, i64);
        };
        let err = derive_record_impl(&input).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_rejects_duplicate_tag() {
        let input: DeriveInput = syn::parse_quote! {
            struct S {
                #[db("a")]
                #[db("b")]
                a: String,
            }
        };
        let err = derive_record_impl(&input).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}
