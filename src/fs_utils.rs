use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Reads the whole file at `path` as text.
///
/// Contents are returned verbatim: no trimming and no newline normalization.
/// Byte sequences that are not valid UTF-8 are replaced with U+FFFD rather
/// than failing the read.
///
/// # Errors
///
/// Returns the underlying `io::Error` when the file cannot be opened or read
/// (missing, permission denied, is a directory, ...).
pub fn read_file_contents(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

/// Converts `path` into an absolute path, joining relative paths onto `base_dir`.
///
/// The result is cleaned lexically: `.` components are dropped and `..` removes
/// the previous component. Symlinks are not followed and the path does not
/// need to exist. A leading `~` is treated as an ordinary file name.
#[must_use]
pub fn absolutize(path: &Path, base_dir: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };
    clean(&joined)
}

/// Lexically normalizes a path without touching the filesystem.
fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !matches!(
                    cleaned.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                ) {
                    cleaned.pop();
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}
