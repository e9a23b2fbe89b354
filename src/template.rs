use crate::error::{RenderError, Result};
use lithos_gotmpl_core::{FunctionRegistryBuilder, Template, install_text_template_functions};
use serde_json::Value;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Template name used when the source comes from stdin
pub const STDIN_TEMPLATE_NAME: &str = "stdin";

/// A parsed Go `text/template` ready to be rendered against JSON data.
///
/// Field access uses the JSON keys directly (`{{.name}}`), arrays are iterable
/// with `{{range .items}}...{{end}}` and the stock text/template helpers
/// (`len`, `index`, `printf`, `eq`, ...) are available.
pub struct DataTemplate {
    name: String,
    inner: Template,
}

impl DataTemplate {
    /// Parses template source text.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::TemplateParse` if the source is malformed.
    pub fn parse(name: &str, source: &str) -> Result<Self> {
        let mut builder = FunctionRegistryBuilder::new();
        install_text_template_functions(&mut builder);
        let registry = builder.build();

        let inner = Template::parse_with_functions(name, source, registry).map_err(|e| {
            RenderError::TemplateParse {
                message: single_line(&e.to_string()),
            }
        })?;
        debug!(name, "parsed template");

        Ok(Self {
            name: name.to_string(),
            inner,
        })
    }

    /// Reads and parses a template file. The path `-` reads from stdin.
    ///
    /// # Errors
    ///
    /// - `RenderError::TemplateRead` if the file cannot be read.
    /// - `RenderError::TemplateParse` if its contents are malformed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let read_err = |source| RenderError::TemplateRead {
            path: path.to_path_buf(),
            source,
        };

        if path == Path::new("-") {
            info!("Reading template from stdin...");
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(read_err)?;
            return Self::parse(STDIN_TEMPLATE_NAME, &buffer);
        }

        info!("Reading template from {}", path.display());
        let source = fs::read_to_string(path).map_err(read_err)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self::parse(&name, &source)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders the template against `data`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::TemplateExecute` when execution fails.
    pub fn render(&self, data: &Value) -> Result<String> {
        self.inner
            .render(data)
            .map_err(|e| RenderError::TemplateExecute {
                message: single_line(&e.to_string()),
            })
    }

    /// Renders the template and writes the whole result to `out`.
    ///
    /// Nothing is written if execution fails.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::TemplateExecute` or `RenderError::Io`.
    pub fn render_to<W: Write>(&self, data: &Value, out: &mut W) -> Result<()> {
        let rendered = self.render(data)?;
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Collapses a multi-line engine message into one diagnostic line
fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}
