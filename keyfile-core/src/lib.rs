//! Local store for the credential files (PEM certificates and PKCS#12 key
//! bundles) used by the tunnel client.
//!
//! The host UI collects a file name and content, either typed by the user or
//! imported through an [`ImportSource`], and hands them to a
//! [`CredentialStore`]. The store validates the name, persists the content
//! crash-safely in its private directory, and removes the previous file when
//! an entry is renamed.
//!
//! ```rust,no_run
//! use keyfile_core::{CredentialStore, StaleCleanup};
//!
//! # fn main() -> Result<(), keyfile_core::KeyFileError> {
//! let store = CredentialStore::new("/data/keys")?;
//! store.write("client.p12", "...", None)?;
//! let outcome = store.write("client2.p12", "...", Some("client.p12".to_string()))?;
//! assert_eq!(outcome.cleanup, StaleCleanup::Removed);
//! # Ok(())
//! # }
//! ```
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

mod entry;
pub use entry::*;

mod error;
pub use error::*;

mod import;
pub use import::*;

pub mod logger;

mod name;
pub use name::*;

pub mod storage;
pub use storage::{CredentialStore, StoreOptions, StorePaths};

uniffi::setup_scaffolding!("keyfile_core");
