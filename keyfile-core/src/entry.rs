//! Values passed into and returned from store operations.

use crate::name::CredentialKind;

/// A named credential file and its text content.
///
/// The content is opaque to the store: it is never parsed or checked for
/// being a well-formed certificate or key.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct CredentialEntry {
    /// File name, also the storage key.
    pub name: String,
    /// File content.
    pub content: String,
}

impl CredentialEntry {
    /// Creates an entry from a name and its content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Returns the kind of credential this entry holds, if its name has a
    /// recognised extension.
    #[must_use]
    pub fn kind(&self) -> Option<CredentialKind> {
        CredentialKind::from_name(&self.name)
    }
}

/// What happened to the previous file after a rename.
///
/// Removal of the old file is best effort. A failure here does not fail the
/// write, since the new file is already in place, but it is reported so the
/// caller never sees an orphaned file as a clean success.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum StaleCleanup {
    /// No previous name was given, or it matched the new name.
    NotRequested,
    /// The previous file was removed.
    Removed,
    /// There was no file under the previous name.
    AlreadyAbsent,
    /// The previous file could not be removed and is still on disk.
    Failed {
        /// Why the removal failed.
        message: String,
    },
}

impl StaleCleanup {
    /// Whether the cleanup step left an orphaned file behind.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct WriteOutcome {
    /// Name the content was written under.
    pub name: String,
    /// Outcome of removing the previous file, reported separately from the
    /// write itself.
    pub cleanup: StaleCleanup,
}
