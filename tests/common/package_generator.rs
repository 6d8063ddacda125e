//! npm-style archive generation for build tests
//!
//! Archives are gzip-compressed tars whose entries live under a single
//! wrapper directory, `package/` unless configured otherwise.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Builds one `.tgz` in memory
pub struct TarballBuilder {
    root: String,
    builder: tar::Builder<Vec<u8>>,
}

#[allow(dead_code)] // Not every test binary uses every helper
impl TarballBuilder {
    /// Archive rooted at `package/`
    pub fn new() -> Self {
        Self::with_root("package")
    }

    /// Archive rooted at another wrapper directory
    pub fn with_root(root: &str) -> Self {
        Self {
            root: root.to_string(),
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Add a regular file below the wrapper directory
    pub fn file(mut self, path: &str, contents: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        self.builder
            .append_data(
                &mut header,
                format!("{}/{path}", self.root),
                contents.as_bytes(),
            )
            .unwrap();
        self
    }

    /// Finish the tar stream and gzip it
    pub fn build(self) -> Vec<u8> {
        let tar = self.builder.into_inner().unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar).unwrap();
        encoder.finish().unwrap()
    }
}

/// Entries of [`react_tarball`], in archive order
pub const REACT_FILES: [&str; 6] = [
    "package.json",
    "LICENSE",
    "index.js",
    "umd/react.development.js",
    "umd/react.production.min.js",
    "cjs/react.development.js",
];

/// A small stand-in for a published react archive
pub fn react_tarball(version: &str) -> Vec<u8> {
    TarballBuilder::new()
        .file(
            "package.json",
            &format!(r#"{{"name":"react","version":"{version}"}}"#),
        )
        .file("LICENSE", "MIT License")
        .file("index.js", "module.exports = require('./cjs/react.development.js');")
        .file("umd/react.development.js", &format!("/* react {version} dev */"))
        .file("umd/react.production.min.js", &format!("/* react {version} prod */"))
        .file("cjs/react.development.js", "'use strict';")
        .build()
}

/// Archive that is not gzip at all
#[allow(dead_code)]
pub fn corrupt_tarball() -> Vec<u8> {
    b"this is not a gzip stream".to_vec()
}
