//! The credential file store.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::paths::{is_same_file, is_temp_file, StorePaths, TEMP_PREFIX, TEMP_SUFFIX};
use crate::entry::{CredentialEntry, StaleCleanup, WriteOutcome};
use crate::error::{KeyFileError, KeyFileResult};
use crate::name::check_name;

/// Configuration for a [`CredentialStore`].
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct StoreOptions {
    /// Create the root directory (and its parents) if it does not exist.
    pub create_root: bool,
    /// `fsync` written files and the root directory so completed writes
    /// survive power loss.
    pub sync_writes: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            create_root: true,
            sync_writes: true,
        }
    }
}

/// Store for credential files in a single private directory.
///
/// Every write validates the target name first; a rejected name never
/// touches the disk. Renames are performed as write-new-then-delete-old, so
/// an interruption can at worst leave the old file behind, never lose the
/// new content.
///
/// # Example
///
/// ```rust,no_run
/// use keyfile_core::{CredentialStore, KeyFileError};
///
/// # fn main() -> Result<(), KeyFileError> {
/// let store = CredentialStore::new("/data/keys")?;
/// store.write("stunnel.pem", "-----BEGIN CERTIFICATE-----\n", None)?;
/// assert!(store.exists("stunnel.pem"));
/// store.delete("stunnel.pem")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, uniffi::Object)]
pub struct CredentialStore {
    paths: StorePaths,
    options: StoreOptions,
}

impl CredentialStore {
    /// Opens a store rooted at `root` with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn new(root: impl AsRef<Path>) -> KeyFileResult<Self> {
        Self::with_options(root, StoreOptions::default())
    }

    /// Opens a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created, or, when
    /// `create_root` is off, if it does not exist.
    pub fn with_options(root: impl AsRef<Path>, options: StoreOptions) -> KeyFileResult<Self> {
        let paths = StorePaths::new(root);
        let root = paths.root();

        if options.create_root {
            fs::create_dir_all(root).map_err(|e| {
                KeyFileError::io(format!("creating store directory '{}'", root.display()), &e)
            })?;
        } else if !root.is_dir() {
            let err = std::io::Error::new(ErrorKind::NotFound, "not a directory");
            return Err(KeyFileError::io(
                format!("opening store directory '{}'", root.display()),
                &err,
            ));
        }

        log::debug!("opened credential store at '{}'", root.display());
        Ok(Self { paths, options })
    }

    /// Returns the paths used by this store.
    #[must_use]
    pub const fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Returns the options this store was opened with.
    #[must_use]
    pub const fn options(&self) -> &StoreOptions {
        &self.options
    }

    fn persist(
        &self,
        name: &str,
        content: &[u8],
        previous_name: Option<&str>,
    ) -> KeyFileResult<WriteOutcome> {
        if let Err(reason) = check_name(name) {
            log::debug!("refusing to write '{name}': {reason}");
            return Err(reason.into());
        }

        self.write_atomic(name, content)?;
        log::debug!("wrote credential file '{name}' ({} bytes)", content.len());

        // The new file is the source of truth from here on. Only now is it
        // safe to drop the old one.
        let cleanup = match previous_name {
            Some(previous) if !previous.is_empty() && previous != name => {
                self.remove_stale(name, previous)
            }
            _ => StaleCleanup::NotRequested,
        };

        Ok(WriteOutcome {
            name: name.to_string(),
            cleanup,
        })
    }

    fn remove_stale(&self, name: &str, previous: &str) -> StaleCleanup {
        if let (Some(current), Some(stale)) = (self.resolve(name), self.resolve(previous)) {
            // Both names point at the file just written.
            if is_same_file(&current, &stale) {
                log::debug!("'{previous}' and '{name}' are the same file, keeping it");
                return StaleCleanup::NotRequested;
            }
        }

        match self.remove(previous) {
            Ok(()) => {
                log::debug!("removed previous credential file '{previous}'");
                StaleCleanup::Removed
            }
            Err(KeyFileError::NotFound { .. }) => StaleCleanup::AlreadyAbsent,
            Err(err) => {
                log::warn!("failed to remove previous credential file '{previous}': {err}");
                StaleCleanup::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    fn remove(&self, name: &str) -> KeyFileResult<()> {
        let path = self.paths.entry_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                // The file is gone either way; a failed sync only weakens
                // durability of the removal.
                if let Err(err) = self.sync_directory() {
                    log::warn!("removed '{name}' but could not sync the store directory: {err}");
                }
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(KeyFileError::not_found(name)),
            Err(e) => Err(KeyFileError::io(
                format!("deleting '{}'", path.display()),
                &e,
            )),
        }
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> KeyFileResult<()> {
        let final_path = self.paths.entry_path(name)?;
        let root = self.paths.root();

        // Dropping the temp file on any error path removes it.
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(root)
            .map_err(|e| {
                KeyFileError::io(
                    format!("creating temporary file in '{}'", root.display()),
                    &e,
                )
            })?;

        temp.write_all(bytes).map_err(|e| {
            KeyFileError::io(format!("writing '{}'", temp.path().display()), &e)
        })?;

        if self.options.sync_writes {
            temp.as_file().sync_all().map_err(|e| {
                KeyFileError::io(format!("syncing '{}'", temp.path().display()), &e)
            })?;
        }

        temp.persist(&final_path).map_err(|e| {
            KeyFileError::io(
                format!(
                    "renaming '{}' to '{}'",
                    e.file.path().display(),
                    final_path.display()
                ),
                &e.error,
            )
        })?;

        self.sync_directory()
    }

    /// Makes a rename or delete in the root durable.
    #[cfg(unix)]
    fn sync_directory(&self) -> KeyFileResult<()> {
        if !self.options.sync_writes {
            return Ok(());
        }
        let root = self.paths.root();
        fs::File::open(root)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| KeyFileError::io(format!("syncing directory '{}'", root.display()), &e))
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps, clippy::unused_self)]
    fn sync_directory(&self) -> KeyFileResult<()> {
        // Directories cannot be opened for syncing here; rename is still atomic.
        Ok(())
    }

    fn read_dir_names(&self) -> KeyFileResult<Vec<String>> {
        let root = self.paths.root();
        let context = || format!("listing '{}'", root.display());

        let mut names = Vec::new();
        for entry in fs::read_dir(root).map_err(|e| KeyFileError::io(context(), &e))? {
            let entry = entry.map_err(|e| KeyFileError::io(context(), &e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| KeyFileError::io(context(), &e))?;
            if !file_type.is_file() {
                continue;
            }
            // Names that are not valid UTF-8 were never written by this store.
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.paths.entry_path(name).ok()
    }
}

#[uniffi::export]
impl CredentialStore {
    /// Opens a store rooted at `root` with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    #[uniffi::constructor]
    pub fn from_root(root: &str) -> KeyFileResult<Self> {
        Self::new(root)
    }

    /// Opens a store rooted at `root` with the given options.
    ///
    /// # Errors
    ///
    /// See [`CredentialStore::with_options`].
    #[uniffi::constructor]
    pub fn from_root_with_options(root: &str, options: &StoreOptions) -> KeyFileResult<Self> {
        Self::with_options(root, options.clone())
    }

    /// Reads the content of `name` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// - [`KeyFileError::NotFound`] if there is no such file.
    /// - [`KeyFileError::Io`] if reading fails or the content is not valid
    ///   UTF-8.
    /// - [`KeyFileError::Rejected`] if `name` would resolve outside the root.
    pub fn read(&self, name: &str) -> KeyFileResult<String> {
        let path = self.paths.entry_path(name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(KeyFileError::not_found(name))
            }
            Err(e) => {
                return Err(KeyFileError::io(format!("reading '{}'", path.display()), &e))
            }
        };
        String::from_utf8(bytes).map_err(|e| KeyFileError::Io {
            context: format!("decoding '{}' as UTF-8", path.display()),
            message: e.utf8_error().to_string(),
        })
    }

    /// Reads `name` into a [`CredentialEntry`].
    ///
    /// # Errors
    ///
    /// Same as [`CredentialStore::read`].
    pub fn load(&self, name: &str) -> KeyFileResult<CredentialEntry> {
        let content = self.read(name)?;
        Ok(CredentialEntry::new(name, content))
    }

    /// Writes `content` under `name`, replacing any existing file.
    ///
    /// When `previous_name` is given, is not empty and differs from `name`,
    /// the previous file is removed after the new one is in place. The
    /// outcome of that removal is reported in [`WriteOutcome::cleanup`] and
    /// never fails the write.
    ///
    /// # Errors
    ///
    /// - [`KeyFileError::Rejected`] if `name` fails validation; nothing is
    ///   written.
    /// - [`KeyFileError::Io`] if the content could not be written.
    #[allow(clippy::needless_pass_by_value)] // `Option<&str>` is not supported by UniFFI
    pub fn write(
        &self,
        name: &str,
        content: &str,
        previous_name: Option<String>,
    ) -> KeyFileResult<WriteOutcome> {
        self.persist(name, content.as_bytes(), previous_name.as_deref())
    }

    /// Writes `entry`, removing `previous_name` if the entry was renamed.
    ///
    /// # Errors
    ///
    /// Same as [`CredentialStore::write`].
    #[allow(clippy::needless_pass_by_value)] // `Option<&str>` is not supported by UniFFI
    pub fn save(
        &self,
        entry: &CredentialEntry,
        previous_name: Option<String>,
    ) -> KeyFileResult<WriteOutcome> {
        self.persist(
            &entry.name,
            entry.content.as_bytes(),
            previous_name.as_deref(),
        )
    }

    /// Deletes `name`.
    ///
    /// # Errors
    ///
    /// - [`KeyFileError::NotFound`] if there is no such file; the directory
    ///   is left unchanged.
    /// - [`KeyFileError::Io`] if the file exists but could not be removed.
    /// - [`KeyFileError::Rejected`] if `name` would resolve outside the root.
    pub fn delete(&self, name: &str) -> KeyFileResult<()> {
        self.remove(name)?;
        log::debug!("deleted credential file '{name}'");
        Ok(())
    }

    /// Whether a file called `name` exists in the store.
    ///
    /// Names that would resolve outside the root never exist.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some_and(|path| path.is_file())
    }

    /// Lists the names of all credential files in the store, sorted.
    ///
    /// Files whose names would not pass validation, such as leftovers of
    /// interrupted writes, are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`KeyFileError::Io`] if the directory cannot be read.
    pub fn list(&self) -> KeyFileResult<Vec<String>> {
        let mut names: Vec<String> = self
            .read_dir_names()?
            .into_iter()
            .filter(|name| check_name(name).is_ok())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Removes temporary files left behind by interrupted writes and returns
    /// how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`KeyFileError::Io`] if the directory cannot be read or a
    /// leftover cannot be removed.
    pub fn remove_stale_temp_files(&self) -> KeyFileResult<u32> {
        let root = self.paths.root();
        let mut removed = 0u32;
        for name in self.read_dir_names()? {
            if !is_temp_file(&name) {
                continue;
            }
            let path = root.join(&name);
            fs::remove_file(&path).map_err(|e| {
                KeyFileError::io(format!("removing '{}'", path.display()), &e)
            })?;
            removed = removed.saturating_add(1);
        }
        if removed > 0 {
            log::info!("removed {removed} leftover temporary file(s)");
            self.sync_directory()?;
        }
        Ok(removed)
    }

    /// Returns the store's root directory as a string.
    #[must_use]
    pub fn root_path_string(&self) -> String {
        self.paths.root_path_string()
    }
}
