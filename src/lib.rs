//! # atrender
//!
//! Renders a Go-style text template against a JSON data object whose string
//! values may point at files. Any string that starts with `@` is replaced by the
//! contents of the file it names before the template runs, which makes it easy
//! to assemble large text artifacts (prompts, generated code, config files) from
//! one small JSON document and a handful of sibling files.
//!
//! ## Features
//!
//! - Inline JSON or `@data.json` as input
//! - `"@path"` strings anywhere in the data, at any depth
//! - `$NAME` / `${NAME}` expansion inside nested reference paths
//! - Relative reference paths resolved against a base directory
//! - Go `text/template` syntax for the template itself
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```no_run
//! use atrender::{InputSource, Resolver, render_document};
//! use std::path::Path;
//!
//! let input = InputSource::from_arg(r#"{"body": "@notes/body.txt"}"#);
//! let resolver = Resolver::default();
//! let mut out = std::io::stdout();
//!
//! if let Err(e) = render_document(&input, Path::new("page.tmpl"), &resolver, &mut out) {
//!     eprintln!("Error: {e}");
//! }
//! ```
//!
//! ### As a CLI Tool
//!
//! ```bash
//! # Inline data
//! atrender --input '{"name":"world"}' --template hello.tmpl
//!
//! # Data from a file, references resolved against another directory
//! atrender --input @data.json --template page.tmpl --base-dir ./assets
//!
//! # Show which files the data refers to
//! atrender --input @data.json --template page.tmpl --list=detailed
//! ```

pub mod env;
pub mod error;
pub mod fs_utils;
pub mod input;
pub mod render;
pub mod resolve;
pub mod template;

// Re-export main types and functions for convenience
pub use error::{RenderError, Result};
pub use input::{InputSource, decode_document};
pub use render::{load_data, render_document};
pub use resolve::{AtReference, ResolveConfig, Resolver, find_references};
pub use template::DataTemplate;
