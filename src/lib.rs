//! Deterministic fingerprints of the native state of a mobile app project.
//!
//! A fingerprint is a digest over a set of typed sources (files, directory trees and inline
//! contents). Comparing a stored fingerprint with a fresh one tells whether a native build
//! made from the stored state can still be reused.
//!
//! ```no_run
//! use native_fingerprint::{config::load_options, create_fingerprint, RawOptions};
//! use std::path::Path;
//!
//! let root = Path::new("./my-app");
//! let options = load_options(root, RawOptions::default())?;
//! let fingerprint = create_fingerprint(root, &options)?;
//! println!("{}", fingerprint.hash);
//! # Ok::<(), native_fingerprint::FingerprintError>(())
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod hash;
pub mod sourcer;
pub mod utils;

use std::path::Path;

pub use config::{normalize, Options, Platform, RawOptions};
pub use diff::{diff_fingerprints, FingerprintDiffItem};
pub use error::{ConfigError, FingerprintError, Result};
pub use hash::{Fingerprint, FingerprintSource, HashSource};
pub use sourcer::{create_fingerprint_with, DefaultSourcer, Sourcer};
pub use utils::HashAlgorithm;

/// Fingerprint a project with the [`DefaultSourcer`].
pub fn create_fingerprint(project_root: &Path, options: &Options) -> Result<Fingerprint> {
    create_fingerprint_with(&DefaultSourcer, project_root, options)
}

/// The fingerprint digest alone.
pub fn create_project_hash(project_root: &Path, options: &Options) -> Result<String> {
    Ok(create_fingerprint(project_root, options)?.hash)
}

/// Changes between a stored fingerprint and the current state of the project.
pub fn diff_fingerprint_changes(
    fingerprint: &Fingerprint,
    project_root: &Path,
    options: &Options,
) -> Result<Vec<FingerprintDiffItem>> {
    diff::diff_fingerprint_changes_with(&DefaultSourcer, fingerprint, project_root, options)
}
