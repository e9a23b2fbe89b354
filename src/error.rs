use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for atrender operations
#[derive(Error, Debug)]
pub enum RenderError {
    /// The top-level `@FILE` input could not be read
    #[error("failed to read input file '{}': {source}", .path.display())]
    InputRead { path: PathBuf, source: io::Error },

    /// Input text is not well-formed JSON
    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Input nests arrays/objects deeper than the decoder accepts
    #[error("failed to parse JSON: exceeded max nesting depth of {max}")]
    TooDeep { max: usize },

    /// Input is valid JSON but the root is not an object
    #[error("failed to parse JSON: top-level value must be an object, found {found}")]
    NotAnObject { found: &'static str },

    /// A file named by a nested at-reference could not be read
    #[error("failed to read file '{}': {source}", .path.display())]
    ReferenceRead { path: PathBuf, source: io::Error },

    /// Template file missing or unreadable
    #[error("failed to read template '{}': {source}", .path.display())]
    TemplateRead { path: PathBuf, source: io::Error },

    /// Template source is malformed
    #[error("failed to parse template: {message}")]
    TemplateParse { message: String },

    /// Template failed while rendering (undefined field, type mismatch, ...)
    #[error("failed to execute template: {message}")]
    TemplateExecute { message: String },

    /// Writing rendered output failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
