use crate::env::expand_env_with;
use crate::error::{RenderError, Result};
use crate::fs_utils::{absolutize, read_file_contents};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Marker that turns a string value into a file reference
pub const AT_PREFIX: char = '@';

/// Configuration for at-reference resolution
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// Directory relative path-specs are joined onto (usually the working directory)
    pub base_dir: PathBuf,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            base_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

type EnvLookup = dyn Fn(&str) -> Option<String>;

/// Rewrites every `"@path"` string in a decoded JSON tree into the contents of
/// the file it names.
///
/// Only the first byte is inspected. Loaded contents are inserted verbatim and
/// never scanned again, so a file that itself starts with `@` survives as-is.
pub struct Resolver {
    config: ResolveConfig,
    env: Box<EnvLookup>,
}

impl Resolver {
    /// Creates a resolver that expands variables from the process environment.
    #[must_use]
    pub fn new(config: ResolveConfig) -> Self {
        Self::with_env(config, |name| std::env::var(name).ok())
    }

    /// Creates a resolver with a custom environment lookup.
    pub fn with_env<F>(config: ResolveConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        Self {
            config,
            env: Box::new(env),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Turns a path-spec (the text after `@`) into the absolute path it names.
    #[must_use]
    pub fn resolve_path(&self, spec: &str) -> PathBuf {
        let expanded = expand_env_with(spec, |name| (self.env)(name));
        absolutize(Path::new(expanded.as_ref()), &self.config.base_dir)
    }

    /// Resolves a whole tree.
    ///
    /// Objects keep their key sets and arrays keep their length and order; only
    /// string leaves change. Traversal uses an explicit stack so nesting depth is
    /// bounded by memory, not by the call stack.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::ReferenceRead` for the first referenced file that
    /// cannot be read. The partially rewritten tree is dropped.
    pub fn resolve(&self, mut value: Value) -> Result<Value> {
        let mut stack: Vec<&mut Value> = vec![&mut value];
        let mut replaced = 0usize;

        while let Some(current) = stack.pop() {
            match current {
                Value::String(text) => {
                    if let Some(spec) = text.strip_prefix(AT_PREFIX) {
                        let contents = self.load(spec)?;
                        *text = contents;
                        replaced += 1;
                    }
                }
                // reversed so siblings are visited first-to-last
                Value::Array(items) => stack.extend(items.iter_mut().rev()),
                Value::Object(map) => stack.extend(map.values_mut().rev()),
                Value::Null | Value::Bool(_) | Value::Number(_) => {}
            }
        }

        debug!(replaced, "resolved at-references");
        Ok(value)
    }

    /// Resolves a decoded document whose root is an object.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub fn resolve_document(&self, document: Map<String, Value>) -> Result<Map<String, Value>> {
        match self.resolve(Value::Object(document))? {
            Value::Object(map) => Ok(map),
            // resolution never changes container kinds
            other => Err(RenderError::NotAnObject {
                found: value_kind(&other),
            }),
        }
    }

    fn load(&self, spec: &str) -> Result<String> {
        let path = self.resolve_path(spec);
        trace!(spec, path = %path.display(), "reading at-reference");
        read_file_contents(&path).map_err(|source| RenderError::ReferenceRead { path, source })
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolveConfig::default())
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// An at-reference found in a decoded tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtReference {
    /// JSON Pointer (RFC 6901) of the string value, `""` for the root
    pub pointer: String,
    /// Path-spec as written, without the leading `@`
    pub spec: String,
    /// Absolute path after variable expansion
    pub path: PathBuf,
}

/// Lists every at-reference in `value` without reading any file.
///
/// Arrays are walked first-to-last and objects in map key order.
#[must_use]
pub fn find_references(value: &Value, resolver: &Resolver) -> Vec<AtReference> {
    let mut references = Vec::new();
    let mut stack: Vec<(String, &Value)> = vec![(String::new(), value)];

    while let Some((pointer, current)) = stack.pop() {
        match current {
            Value::String(text) => {
                if let Some(spec) = text.strip_prefix(AT_PREFIX) {
                    references.push(AtReference {
                        path: resolver.resolve_path(spec),
                        spec: spec.to_string(),
                        pointer,
                    });
                }
            }
            Value::Array(items) => stack.extend(
                items
                    .iter()
                    .enumerate()
                    .rev()
                    .map(|(index, item)| (format!("{pointer}/{index}"), item)),
            ),
            Value::Object(map) => stack.extend(map.iter().rev().map(|(key, item)| {
                (format!("{pointer}/{}", escape_pointer_token(key)), item)
            })),
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    references
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Human-readable name of a JSON value's kind
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
