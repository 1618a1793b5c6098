//! Derive macros for litorm
//!
//! Provides `#[derive(Model)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod model;

/// Derive `Model` metadata and row population for a struct.
///
/// # Example
///
/// ```ignore
/// use litorm::Model;
///
/// #[derive(Model, Default)]
/// struct User {
///     #[orm(key)]
///     id: i64,
///     #[orm(uuid)]
///     token: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
///     #[orm(skip)]
///     cached: Vec<String>,
/// }
/// ```
///
/// # Generated
///
/// - `fn descriptor() -> &'static ModelDescriptor` - column metadata
/// - `fn from_row(row: &Row) -> Self` - lenient population from a decoded row
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(key)]` - Mark field as primary key (first one wins)
/// - `#[orm(uuid)]` - Generate a v4 UUID on create when the payload lacks it
/// - `#[orm(skip)]` - Not mapped; left at `Default`
#[proc_macro_derive(Model, attributes(orm))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
