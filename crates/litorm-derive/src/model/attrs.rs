//! Field-level `#[orm(...)]` attribute parsing.

use syn::Result;

/// Parsed `#[orm(...)]` options of one field.
#[derive(Default)]
pub(super) struct FieldAttr {
    pub column: Option<String>,
    pub key: bool,
    pub uuid: bool,
    pub skip: bool,
}

impl FieldAttr {
    fn merge(&mut self, other: FieldAttr) {
        if other.column.is_some() {
            self.column = other.column;
        }
        self.key |= other.key;
        self.uuid |= other.uuid;
        self.skip |= other.skip;
    }
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        // Comma-separated markers (`key`, `uuid`, `skip`) or `column = "..."`.
        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            if ident == "key" {
                attr.key = true;
            } else if ident == "uuid" {
                attr.uuid = true;
            } else if ident == "skip" {
                attr.skip = true;
            } else if ident == "column" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                attr.column = Some(value.value());
            } else {
                return Err(syn::Error::new(
                    ident.span(),
                    format!(
                        "unknown orm attribute `{}`; expected one of: column, key, uuid, skip",
                        ident
                    ),
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        if !input.is_empty() {
            return Err(input.error("expected `,`"));
        }
        Ok(attr)
    }
}

/// Collect all `#[orm(...)]` attributes of a field.
pub(super) fn field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut out = FieldAttr::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        out.merge(attr.parse_args::<FieldAttr>()?);
    }
    if out.skip && (out.key || out.uuid) {
        return Err(syn::Error::new_spanned(
            field,
            "#[orm(skip)] cannot be combined with key or uuid",
        ));
    }
    Ok(out)
}
