//! Loading and decoding of the top-level JSON document.

use crate::error::{RenderError, Result};
use crate::resolve::value_kind;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Where the JSON document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// The argument itself is the JSON text
    Inline(String),
    /// `@path`: the JSON text is read from a file
    File(PathBuf),
}

impl InputSource {
    /// Interprets a command-line `input` argument.
    ///
    /// A leading `@` selects file mode. The remainder is used as the path
    /// literally, without environment expansion.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        match arg.strip_prefix('@') {
            Some(path) => Self::File(PathBuf::from(path)),
            None => Self::Inline(arg.to_string()),
        }
    }

    /// Returns the JSON source text.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::InputRead` if the input file cannot be read.
    pub fn load(&self) -> Result<String> {
        match self {
            Self::Inline(text) => Ok(text.clone()),
            Self::File(path) => {
                info!("Reading input from {}", path.display());
                let bytes = fs::read(path).map_err(|source| RenderError::InputRead {
                    path: path.clone(),
                    source,
                })?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }
}

/// Deepest array/object nesting accepted by [`decode_document`]
pub const MAX_NESTING_DEPTH: usize = 10_000;

/// Parses JSON text into a document whose root must be an object.
///
/// Nesting up to [`MAX_NESTING_DEPTH`] levels is accepted; the parser grows its
/// stack on demand instead of relying on serde_json's recursion limit.
///
/// # Errors
///
/// - `RenderError::TooDeep` if nesting exceeds [`MAX_NESTING_DEPTH`].
/// - `RenderError::Parse` if the text is not well-formed JSON.
/// - `RenderError::NotAnObject` if the root is any other kind of value.
pub fn decode_document(source: &str) -> Result<Map<String, Value>> {
    if exceeds_depth(source, MAX_NESTING_DEPTH) {
        return Err(RenderError::TooDeep {
            max: MAX_NESTING_DEPTH,
        });
    }

    let mut deserializer = serde_json::Deserializer::from_str(source);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(RenderError::NotAnObject {
            found: value_kind(&other),
        }),
    }
}

/// Scans bracket nesting outside string literals, stopping once `max` is passed.
fn exceeds_depth(source: &str, max: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for byte in source.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > max {
                    return true;
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_arg_inline() {
        let source = InputSource::from_arg(r#"{"name":"world"}"#);
        assert_eq!(source, InputSource::Inline(r#"{"name":"world"}"#.to_string()));
        assert_eq!(source.load().unwrap(), r#"{"name":"world"}"#);
    }

    #[test]
    fn test_from_arg_file() {
        let source = InputSource::from_arg("@/tmp/data.json");
        assert_eq!(source, InputSource::File(PathBuf::from("/tmp/data.json")));
    }

    #[test]
    fn test_from_arg_file_is_not_env_expanded() {
        let source = InputSource::from_arg("@$HOME/data.json");
        assert_eq!(source, InputSource::File(PathBuf::from("$HOME/data.json")));
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, r#"{"k":"v"}"#).unwrap();

        let source = InputSource::from_arg(&format!("@{}", path.display()));
        assert_eq!(source.load().unwrap(), r#"{"k":"v"}"#);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");

        let err = InputSource::File(path.clone()).load().unwrap_err();
        match err {
            RenderError::InputRead { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_document() {
        let document = decode_document(r#"{"a": 1, "b": ["x", null], "c": {"d": true}}"#).unwrap();
        assert_eq!(document.len(), 3);
        assert_eq!(document["b"][0], "x");
    }

    fn nested_arrays(depth: usize) -> String {
        format!(r#"{{"a":{}1{}}}"#, "[".repeat(depth), "]".repeat(depth))
    }

    #[test]
    fn test_decode_deeply_nested() {
        let document = decode_document(&nested_arrays(300)).unwrap();
        let mut value = &document["a"];
        for _ in 0..300 {
            value = &value[0];
        }
        assert_eq!(value, 1);
    }

    /// Takes a nested array chain apart level by level so the drop stays shallow
    fn unnest(mut value: Value) -> Value {
        while let Value::Array(mut items) = value {
            value = items.pop().unwrap();
        }
        value
    }

    #[test]
    fn test_decode_depth_limit() {
        // the root object counts as one level
        let mut document = decode_document(&nested_arrays(MAX_NESTING_DEPTH - 1)).unwrap();
        assert_eq!(unnest(document.remove("a").unwrap()), 1);
        assert!(matches!(
            decode_document(&nested_arrays(MAX_NESTING_DEPTH)),
            Err(RenderError::TooDeep { max: MAX_NESTING_DEPTH })
        ));
    }

    #[test]
    fn test_exceeds_depth_ignores_brackets_in_strings() {
        assert!(!exceeds_depth(r#"{"a": "[[[[{{{{"}"#, 2));
        assert!(!exceeds_depth(r#"{"a": "\"[[["}"#, 2));
        assert!(exceeds_depth(r#"{"a": [[1]]}"#, 2));
    }

    #[test]
    fn test_decode_trailing_garbage() {
        assert!(matches!(
            decode_document(r#"{"a": 1} x"#),
            Err(RenderError::Parse(_))
        ));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            decode_document(r#"{"a": "#),
            Err(RenderError::Parse(_))
        ));
        assert!(matches!(decode_document(""), Err(RenderError::Parse(_))));
    }

    #[test]
    fn test_decode_non_object_root() {
        for (text, kind) in [("[1, 2]", "array"), ("\"@x\"", "string"), ("42", "number"), ("null", "null")] {
            match decode_document(text) {
                Err(RenderError::NotAnObject { found }) => assert_eq!(found, kind),
                other => panic!("unexpected result for {text}: {other:?}"),
            }
        }
    }
}
