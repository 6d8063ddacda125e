//! Registry metadata models

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Package metadata document (a "packument")
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Packument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub versions: Versions,
}

impl Packument {
    /// Published version strings in document order
    pub fn version_keys(&self) -> impl Iterator<Item = &str> {
        self.versions.0.iter().map(|(key, _)| key.as_str())
    }

    /// Metadata for one published version
    #[must_use]
    pub fn version(&self, key: &str) -> Option<&VersionMetadata> {
        self.versions
            .0
            .iter()
            .find_map(|(k, meta)| (k == key).then_some(meta))
    }
}

/// The `versions` map, kept in the order the registry wrote it
#[derive(Debug, Clone, Default)]
pub struct Versions(pub Vec<(String, VersionMetadata)>);

impl Versions {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-version metadata; only the archive location is used
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionMetadata {
    #[serde(default)]
    pub dist: Option<Dist>,
}

impl VersionMetadata {
    #[must_use]
    pub fn tarball(&self) -> Option<&str> {
        self.dist.as_ref().map(|d| d.tarball.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dist {
    pub tarball: String,
}

impl<'de> Deserialize<'de> for Versions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VersionsVisitor;

        impl<'de> Visitor<'de> for VersionsVisitor {
            type Value = Versions;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of version strings to version metadata")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, VersionMetadata>()? {
                    entries.push((key, value));
                }
                Ok(Versions(entries))
            }
        }

        deserializer.deserialize_map(VersionsVisitor)
    }
}
