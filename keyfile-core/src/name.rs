//! File name validation and classification.
//!
//! Every name that reaches the disk goes through [`validate_name`]. The rules
//! are deliberately minimal: they only keep writes inside the store directory
//! and make sure the rest of the client can tell what kind of file it is.

use strum::{EnumString, IntoStaticStr};

use crate::error::{KeyFileError, KeyFileResult};
use thiserror::Error;

/// Reason a candidate file name was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, uniffi::Enum)]
pub enum NameRejection {
    /// The name is empty.
    #[error("a file name is required")]
    EmptyName,
    /// The name does not end in `.pem` or `.p12`.
    #[error("file name must end in .pem or .p12")]
    BadExtension,
    /// The name contains a path separator.
    #[error("file name must not contain slashes")]
    PathTraversal,
}

/// Kind of credential file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, uniffi::Enum)]
pub enum CredentialKind {
    /// PEM-encoded certificate and/or key (`.pem`).
    #[strum(serialize = "pem")]
    Pem,
    /// PKCS#12 bundle (`.p12`).
    #[strum(serialize = "p12")]
    Pkcs12,
}

impl CredentialKind {
    /// Classifies `name` by its extension. Matching is case-sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        extension.parse().ok()
    }

    /// The extension for this kind, without the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        self.into()
    }
}

/// Checks whether `name` is acceptable as a credential file name.
///
/// Rules are checked in order and the first failure wins: the name must be
/// non-empty, must end in `.pem` or `.p12`, and must not contain `/`.
///
/// # Errors
///
/// Returns the [`NameRejection`] for the first rule the name breaks.
pub fn check_name(name: &str) -> Result<CredentialKind, NameRejection> {
    if name.is_empty() {
        return Err(NameRejection::EmptyName);
    }
    let kind = CredentialKind::from_name(name).ok_or(NameRejection::BadExtension)?;
    if contains_separator(name) {
        return Err(NameRejection::PathTraversal);
    }
    Ok(kind)
}

/// Validates a candidate file name.
///
/// # Errors
///
/// Returns [`KeyFileError::Rejected`] with the first rule the name breaks.
#[uniffi::export]
pub fn validate_name(name: &str) -> KeyFileResult<()> {
    check_name(name).map(|_| ()).map_err(KeyFileError::from)
}

/// Returns the kind of credential file `name` refers to, if it has a
/// recognised extension.
#[uniffi::export]
#[must_use]
pub fn credential_kind(name: &str) -> Option<CredentialKind> {
    CredentialKind::from_name(name)
}

pub(crate) fn contains_separator(name: &str) -> bool {
    name.contains('/') || name.contains(std::path::MAIN_SEPARATOR)
}
