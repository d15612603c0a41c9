//! Flat-directory persistence for credential files.
//!
//! One file per entry, file name equal to the entry name, file content equal
//! to the entry content. Writes go through a temporary file in the same
//! directory and are renamed into place, so a reader sees either the old or
//! the new content.
//!
//! The store takes no locks. Hosts that call it from several threads must
//! serialize access to a given root themselves.

mod paths;
mod store;

pub use paths::StorePaths;
pub use store::{CredentialStore, StoreOptions};
