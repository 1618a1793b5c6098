//! Model derive macro implementation
//!
//! Generates a static `ModelDescriptor` (one entry per mapped field) and a
//! `from_row` that reads every mapped column through `litorm::model::field`.

mod attrs;

use attrs::field_attr;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let name_str = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Model cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Model can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Model can only be derived for structs",
            ));
        }
    };

    let mut descriptors = Vec::new();
    let mut initializers = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let attr = field_attr(field)?;

        if attr.skip {
            initializers.push(quote! {
                #ident: ::core::default::Default::default()
            });
            continue;
        }

        let field_name = ident.to_string();
        let column = attr.column.unwrap_or_else(|| field_name.clone());
        let key = attr.key;
        let uuid = attr.uuid;

        descriptors.push(quote! {
            litorm::FieldDescriptor {
                name: #field_name,
                column: #column,
                kind: <#ty as litorm::FromValue>::KIND,
                key: #key,
                uuid: #uuid,
            }
        });
        initializers.push(quote! {
            #ident: litorm::model::field::<#ty>(row, #column)
        });
    }

    Ok(quote! {
        impl litorm::Model for #name {
            fn descriptor() -> &'static litorm::ModelDescriptor {
                static DESCRIPTOR: litorm::ModelDescriptor = litorm::ModelDescriptor {
                    name: #name_str,
                    fields: &[#(#descriptors),*],
                };
                &DESCRIPTOR
            }

            fn from_row(row: &litorm::Row) -> Self {
                Self {
                    #(#initializers),*
                }
            }
        }
    })
}
