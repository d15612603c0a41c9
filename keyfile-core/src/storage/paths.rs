//! Storage path helpers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::KeyFileResult;
use crate::name::{contains_separator, NameRejection};

/// Prefix of temporary files used while writing. Temp names have a fixed
/// length, so any name that fits the filesystem can be written.
pub(crate) const TEMP_PREFIX: &str = ".keyfile-";
pub(crate) const TEMP_SUFFIX: &str = ".tmp";

/// Paths for credential files under a single flat root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    root: PathBuf,
}

impl StorePaths {
    /// Builds storage paths rooted at `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the storage root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the entry called `name`.
    ///
    /// Only checks that `name` stays inside the root. The extension is not
    /// checked, so files written by older versions can still be reached.
    ///
    /// # Errors
    ///
    /// Returns [`NameRejection::EmptyName`] for an empty name and
    /// [`NameRejection::PathTraversal`] for `.`, `..` or a name containing a
    /// path separator.
    pub fn entry_path(&self, name: &str) -> KeyFileResult<PathBuf> {
        ensure_contained(name)?;
        Ok(self.root.join(name))
    }

    /// Returns the root directory as a string.
    #[must_use]
    pub fn root_path_string(&self) -> String {
        self.root.to_string_lossy().to_string()
    }
}

/// Whether `file_name` is a leftover from an interrupted write.
pub(crate) fn is_temp_file(file_name: &str) -> bool {
    file_name.len() > TEMP_PREFIX.len() + TEMP_SUFFIX.len()
        && file_name.starts_with(TEMP_PREFIX)
        && file_name.ends_with(TEMP_SUFFIX)
}

/// Whether `a` and `b` name the same file on disk.
///
/// Differently spelled names can alias one file, e.g. `Cert.pem` and
/// `cert.pem` on a case-insensitive volume. Missing files are never the same.
#[cfg(unix)]
pub(crate) fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
pub(crate) fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn ensure_contained(name: &str) -> Result<(), NameRejection> {
    if name.is_empty() {
        return Err(NameRejection::EmptyName);
    }
    if name == "." || name == ".." || contains_separator(name) {
        return Err(NameRejection::PathTraversal);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_paths() {
        let root = PathBuf::from("/tmp/keyfile-paths");
        let paths = StorePaths::new(&root);

        assert_eq!(paths.root(), root);
        assert_eq!(
            paths.entry_path("client.p12").expect("path"),
            root.join("client.p12")
        );
        assert_eq!(paths.root_path_string(), root.to_string_lossy());
    }

    #[test]
    fn test_entry_path_ignores_extension() {
        let paths = StorePaths::new("/tmp/keyfile-paths");
        assert!(paths.entry_path("legacy.crt").is_ok());
    }

    #[test]
    fn test_entry_path_stays_in_root() {
        let paths = StorePaths::new("/tmp/keyfile-paths");
        for name in ["..", ".", "a/b.pem", "../x.pem"] {
            let err = paths.entry_path(name).expect_err(name);
            assert_eq!(err.rejection(), Some(NameRejection::PathTraversal));
        }
        let err = paths.entry_path("").expect_err("empty");
        assert_eq!(err.rejection(), Some(NameRejection::EmptyName));
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(".keyfile-Xa81Qz.tmp"));
        assert!(!is_temp_file("client.p12"));
        assert!(!is_temp_file(".keyfile-.tmp"));
        assert!(!is_temp_file("notes.tmp"));
    }

    #[test]
    fn test_is_same_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = dir.path().join("a.pem");
        let b = dir.path().join("b.pem");
        fs::write(&a, "a").expect("write a");
        fs::write(&b, "b").expect("write b");

        assert!(is_same_file(&a, &a));
        assert!(!is_same_file(&a, &b));
        assert!(!is_same_file(&a, &dir.path().join("missing.pem")));

        let linked = dir.path().join("linked.pem");
        fs::hard_link(&a, &linked).expect("hard link");
        assert!(is_same_file(&a, &linked));
    }
}
