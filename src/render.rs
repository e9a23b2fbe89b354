use crate::error::Result;
use crate::input::{InputSource, decode_document};
use crate::resolve::Resolver;
use crate::template::DataTemplate;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Loads, decodes and resolves the input document.
///
/// # Errors
///
/// Returns input, parse or resolution errors, whichever happens first.
pub fn load_data(input: &InputSource, resolver: &Resolver) -> Result<Value> {
    let source = input.load()?;
    debug!(bytes = source.len(), "decoding input");
    let document = decode_document(&source)?;
    let resolved = resolver.resolve_document(document)?;
    Ok(Value::Object(resolved))
}

/// Runs the whole pipeline: input, decode, resolve, template, render.
///
/// The template is only loaded once the data has resolved successfully, and
/// nothing is written to `out` unless rendering succeeds.
///
/// # Errors
///
/// Returns the first error from any stage.
pub fn render_document<W: Write>(
    input: &InputSource,
    template_path: &Path,
    resolver: &Resolver,
    out: &mut W,
) -> Result<()> {
    let data = load_data(input, resolver)?;
    let template = DataTemplate::from_file(template_path)?;
    debug!(template = template.name(), "rendering");
    template.render_to(&data, out)
}
