#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Output tree management for shdeps
//!
//! Streams package archives into `<outputDir>/<name>@<version>/`, keeping
//! only the entries selected by include/exclude filters, and provides the
//! idempotent directory helpers the build uses around it.

mod archive;
mod filter;
mod fs;

pub use archive::extract_tarball;
pub use filter::PathFilter;
pub use fs::{ensure_dir, remove_dir_all, write_file};

use std::path::{Path, PathBuf};

/// Directory holding one mirrored version
#[must_use]
pub fn version_dir(output_dir: &Path, name: &str, version: &str) -> PathBuf {
    output_dir.join(format!("{name}@{version}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_dir() {
        assert_eq!(
            version_dir(Path::new("npm"), "react", "17.0.1"),
            PathBuf::from("npm/react@17.0.1")
        );
        assert_eq!(
            version_dir(Path::new("npm"), "@babel/core", "7.0.0"),
            PathBuf::from("npm/@babel/core@7.0.0")
        );
    }
}
