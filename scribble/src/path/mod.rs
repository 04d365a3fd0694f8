// Path resolution - collection/resource validation and on-disk addressing

use crate::error::{Result, ScribbleError};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Extension every record carries on disk.
pub const RECORD_EXTENSION: &str = "json";

/// Suffix of the sibling file a write goes through before its rename.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Reject empty identifiers. Both checks are independent; the collection is
/// reported first when both are missing.
pub fn validate(collection: &str, resource: &str) -> Result<()> {
    validate_collection(collection)?;
    if resource.is_empty() {
        return Err(ScribbleError::MissingResource);
    }
    Ok(())
}

pub fn validate_collection(collection: &str) -> Result<()> {
    if collection.is_empty() {
        return Err(ScribbleError::MissingCollection);
    }
    Ok(())
}

/// Lexically normalize a root directory: drops `.` components and trailing
/// separators. `..` is kept as given.
pub fn clean(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Key a collection is locked under. `./user` and `user/` share the lock
/// of `user`.
pub fn lock_key(collection: &str) -> String {
    clean(Path::new(collection)).to_string_lossy().into_owned()
}

/// True for temp siblings left by a write that has not been renamed yet.
pub fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(TEMP_SUFFIX))
}

/// `<root>/<collection>`
pub fn collection_dir(root: &Path, collection: &str) -> PathBuf {
    root.join(collection)
}

/// `<root>/<collection>/<resource>`, the bare form without the extension.
///
/// Segments are joined structurally only; a resource containing separators
/// or `..` is not sanitized.
pub fn bare_path(root: &Path, collection: &str, resource: &str) -> PathBuf {
    collection_dir(root, collection).join(resource)
}

/// `<root>/<collection>/<resource>.json`
pub fn record_path(root: &Path, collection: &str, resource: &str) -> PathBuf {
    with_suffix(&bare_path(root, collection, resource), &format!(".{RECORD_EXTENSION}"))
}

/// `<root>/<collection>/<resource>.json.tmp`
pub fn temp_path(record: &Path) -> PathBuf {
    with_suffix(record, TEMP_SUFFIX)
}

/// Append a raw suffix to the final path component. Unlike
/// `Path::with_extension`, an existing dot in the name is never replaced.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Find the path that actually exists for a target: the bare path first,
/// then the same path with `.json` appended.
pub fn resolve(path: &Path) -> Result<PathBuf> {
    if exists(path)? {
        return Ok(path.to_path_buf());
    }
    let suffixed = with_suffix(path, &format!(".{RECORD_EXTENSION}"));
    if exists(&suffixed)? {
        return Ok(suffixed);
    }
    Err(ScribbleError::NotFound {
        path: path.to_path_buf(),
    })
}

fn exists(path: &Path) -> Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// True for entries that look like committed records (`*.json`).
pub fn is_record_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate() {
        assert!(validate("user", "alice").is_ok());
        assert!(matches!(
            validate("", "alice"),
            Err(ScribbleError::MissingCollection)
        ));
        assert!(matches!(
            validate("user", ""),
            Err(ScribbleError::MissingResource)
        ));
        assert!(matches!(
            validate("", ""),
            Err(ScribbleError::MissingCollection)
        ));
    }

    #[test]
    fn test_record_path_keeps_dots_in_name() {
        let root = Path::new("/data");
        assert_eq!(
            record_path(root, "user", "alice"),
            PathBuf::from("/data/user/alice.json")
        );
        assert_eq!(
            record_path(root, "user", "j.doe"),
            PathBuf::from("/data/user/j.doe.json")
        );
        assert_eq!(
            temp_path(&record_path(root, "user", "alice")),
            PathBuf::from("/data/user/alice.json.tmp")
        );
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(Path::new("./data/")), PathBuf::from("data"));
        assert_eq!(clean(Path::new("./")), PathBuf::from("."));
        assert_eq!(clean(Path::new("/a/./b")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_resolve_prefers_bare_path() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("user");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("alice.json"), "{}").unwrap();

        // Addressed without the extension
        assert_eq!(resolve(&dir.join("alice")).unwrap(), dir.join("alice.json"));
        // Addressed with it
        assert_eq!(
            resolve(&dir.join("alice.json")).unwrap(),
            dir.join("alice.json")
        );
        // Directories resolve as-is
        assert_eq!(resolve(&dir).unwrap(), dir);
    }

    #[test]
    fn test_resolve_missing() {
        let tmp = TempDir::new().unwrap();
        let err = resolve(&tmp.path().join("nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_lock_key() {
        assert_eq!(lock_key("user"), "user");
        assert_eq!(lock_key("./user/"), "user");
        assert_eq!(lock_key("."), ".");
        assert_eq!(lock_key("user/archive"), "user/archive");
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("a/b.json.tmp")));
        assert!(!is_temp_file(Path::new("a/b.json")));
    }

    #[test]
    fn test_is_record_file() {
        assert!(is_record_file(Path::new("a/b.json")));
        assert!(!is_record_file(Path::new("a/b.json.tmp")));
        assert!(!is_record_file(Path::new("a/b")));
    }
}
