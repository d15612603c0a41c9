use thiserror::Error;

use crate::name::NameRejection;

/// Result type for credential file operations.
pub type KeyFileResult<T> = Result<T, KeyFileError>;

/// Error outputs from the credential file store.
#[derive(Debug, Error, uniffi::Error)]
pub enum KeyFileError {
    /// The file name failed validation. Nothing was touched on disk.
    #[error("invalid file name: {reason}")]
    Rejected {
        /// The first validation rule the name broke.
        reason: NameRejection,
    },

    /// The requested credential file does not exist.
    #[error("credential file not found: {name}")]
    NotFound {
        /// Name of the missing entry.
        name: String,
    },

    /// Underlying storage failure, including undecodable file content.
    #[error("I/O error during {context}: {message}")]
    Io {
        /// Operation that failed.
        context: String,
        /// Error reported by the operating system or decoder.
        message: String,
    },

    /// Imported content could not be read as UTF-8 text.
    #[error("failed to read imported file: {message}")]
    ImportRead {
        /// Description of the failure.
        message: String,
    },

    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl KeyFileError {
    /// Creates an I/O error with context.
    #[must_use]
    pub fn io<S: Into<String>>(context: S, source: &std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: source.to_string(),
        }
    }

    /// Creates a not-found error for `name`.
    #[must_use]
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Returns the rejection reason if this is a validation failure.
    #[must_use]
    pub const fn rejection(&self) -> Option<NameRejection> {
        match self {
            Self::Rejected { reason } => Some(*reason),
            _ => None,
        }
    }
}

impl From<NameRejection> for KeyFileError {
    fn from(reason: NameRejection) -> Self {
        Self::Rejected { reason }
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for KeyFileError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KeyFileError::from(NameRejection::BadExtension);
        assert!(format!("{err}").contains("must end in .pem or .p12"));
        let err = KeyFileError::not_found("client.p12");
        assert_eq!(format!("{err}"), "credential file not found: client.p12");
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = KeyFileError::io("writing 'a.pem'", &io);
        assert_eq!(format!("{err}"), "I/O error during writing 'a.pem': denied");
    }

    #[test]
    fn test_rejection_accessor() {
        let err = KeyFileError::from(NameRejection::PathTraversal);
        assert_eq!(err.rejection(), Some(NameRejection::PathTraversal));
        assert_eq!(KeyFileError::not_found("x.pem").rejection(), None);
    }
}
