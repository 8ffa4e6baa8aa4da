//! core::fsutil
//!
//! Filesystem helpers for artifact trees.
//!
//! # Design
//!
//! Artifacts are directory trees of small JSON and text files. Every
//! helper here reads fresh from disk; there is no caching at this layer.
//! JSON is written with four-space indentation and a trailing newline,
//! matching the layout the authoring tools produce, so regenerated files
//! diff cleanly.
//!
//! Directory copies use merge semantics: files present in the source
//! overwrite their counterparts in the destination, and files that only
//! exist in the destination are left untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors from filesystem operations on artifacts.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to copy '{from}' to '{to}': {message}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },

    #[error("source directory not found: {0}")]
    MissingSource(PathBuf),
}

/// Read a file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, FsError> {
    fs::read_to_string(path).map_err(|e| FsError::Read {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write UTF-8 text, replacing the file.
pub fn write_text(path: &Path, text: &str) -> Result<(), FsError> {
    fs::write(path, text).map_err(|e| FsError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read and parse a JSON document.
pub fn read_json(path: &Path) -> Result<Value, FsError> {
    let contents = read_text(path)?;
    serde_json::from_str(&contents).map_err(|e| FsError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Serialize `value` as indented JSON and write it to `path`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), FsError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).map_err(|e| FsError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    buf.push(b'\n');

    fs::write(path, buf).map_err(|e| FsError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Recursively copy `from` onto `to` with merge semantics.
///
/// Creates `to` (and any intermediate directories) as needed. Returns the
/// number of files copied.
///
/// # Errors
///
/// - `FsError::MissingSource` if `from` is not a directory
/// - `FsError::Copy` if `from` and `to` overlap, or if any entry cannot be
///   walked, created, or copied
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize, FsError> {
    if !from.is_dir() {
        return Err(FsError::MissingSource(from.to_path_buf()));
    }

    let copy_err = |message: String| FsError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        message,
    };

    // Copying a file onto itself truncates it
    if overlaps(from, to) {
        return Err(copy_err("source and destination overlap".into()));
    }

    let mut copied = 0;
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry.map_err(|e| copy_err(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| copy_err(e.to_string()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| copy_err(format!("{}: {}", target.display(), e)))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| copy_err(format!("{}: {}", parent.display(), e)))?;
            }
            fs::copy(entry.path(), &target)
                .map_err(|e| copy_err(format!("{}: {}", relative.display(), e)))?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Whether `a` and `b` are the same directory or one lies inside the other.
///
/// Compared component-wise, so `/w/./X` and `/w/X` are the same path.
/// Symlinks are not resolved.
///
/// ```
/// use regionforge::core::fsutil::overlaps;
/// use std::path::Path;
///
/// assert!(overlaps(Path::new("/w/./X"), Path::new("/w/X")));
/// assert!(overlaps(Path::new("/w"), Path::new("/w/X/def")));
/// assert!(!overlaps(Path::new("/w/X"), Path::new("/w/XY")));
/// ```
pub fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// List every regular file under `root`, sorted, as
/// `(relative path with '/' separators, absolute path)` pairs.
pub fn list_files(root: &Path) -> Result<Vec<(String, PathBuf)>, FsError> {
    if !root.is_dir() {
        return Err(FsError::MissingSource(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| FsError::Read {
            path: root.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        // strip_prefix cannot fail for entries yielded under root
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((relative, entry.path().to_path_buf()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// Read a file's raw bytes.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, FsError> {
    fs::read(path).map_err(|e| FsError::Read {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn json_roundtrip_uses_four_space_indent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");

        write_json(&path, &json!({"config": {"logicalId": "x"}})).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n    \"config\""));
        assert!(raw.ends_with('\n'));

        let back = read_json(&path).unwrap();
        assert_eq!(back, json!({"config": {"logicalId": "x"}}));
    }

    #[test]
    fn read_json_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_json(&path).unwrap_err();
        assert!(matches!(err, FsError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn read_missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = read_text(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, FsError::Read { .. }));
    }

    #[test]
    fn copy_tree_creates_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        write(&src.join("a.txt"), "a");
        write(&src.join("nested/b.txt"), "b");

        let dst = dir.path().join("out/dst");
        let copied = copy_tree(&src, &dst).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dst.join("nested/b.txt")).unwrap(), "b");
    }

    #[test]
    fn copy_tree_merges_instead_of_mirroring() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        write(&src.join("a.txt"), "new");
        write(&dst.join("a.txt"), "old");
        write(&dst.join("extra.txt"), "keep me");

        copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dst.join("extra.txt")).unwrap(), "keep me");
    }

    #[test]
    fn copy_tree_onto_itself_is_refused() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        write(&src.join("a.txt"), "keep");

        let err = copy_tree(&src, &dir.path().join("./src")).unwrap_err();
        assert!(matches!(err, FsError::Copy { .. }));
        assert_eq!(fs::read_to_string(src.join("a.txt")).unwrap(), "keep");

        assert!(copy_tree(&src, &src.join("nested")).is_err());
        assert!(!src.join("nested").exists());
    }

    #[test]
    fn copy_tree_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let err = copy_tree(&dir.path().join("missing"), &dir.path().join("dst")).unwrap_err();
        assert!(matches!(err, FsError::MissingSource(_)));
    }

    #[test]
    fn list_files_is_sorted_and_slash_separated() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("z.json"), "{}");
        write(&dir.path().join("definition/tables/t.tmdl"), "");
        write(&dir.path().join(".platform"), "{}");

        let files: Vec<String> = list_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|(rel, _)| rel)
            .collect();

        assert_eq!(files, vec![".platform", "definition/tables/t.tmdl", "z.json"]);
    }
}
