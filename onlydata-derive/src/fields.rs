//! Parsing of `#[data_view(...)]` field attributes.

use syn::{Field, LitStr, Result};

/// Options parsed from a single field's `#[data_view(...)]` attributes.
#[derive(Default)]
pub(crate) struct FieldOptions {
    /// `#[data_view(skip)]` - the field is omitted from the data view.
    pub(crate) skip: bool,
    /// `#[data_view(rename = "...")]` - the data view key to use in place of
    /// the field name.
    pub(crate) rename: Option<String>,
}

/// Reads the `#[data_view(...)]` attributes off a field.
///
/// Unknown arguments are rejected so typos fail the build instead of being
/// silently ignored.
pub(crate) fn parse_field_options(field: &Field) -> Result<FieldOptions> {
    let mut options = FieldOptions::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("data_view") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                return Ok(());
            }

            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
                return Ok(());
            }

            Err(meta.error("expected `skip` or `rename = \"...\"`"))
        })?;
    }

    Ok(options)
}
