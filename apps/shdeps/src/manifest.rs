//! Deriving the package list from a project manifest

use serde_json::{json, Value};
use std::path::Path;

use crate::error::CliError;

/// Read `path` and turn its `dependencies` into build request packages
pub async fn packages_from_file(path: &Path) -> Result<Value, CliError> {
    let contents = tokio::fs::read_to_string(path).await?;
    let manifest: Value = serde_json::from_str(&contents)
        .map_err(|e| CliError::Manifest(format!("{}: {e}", path.display())))?;
    packages_from_manifest(&manifest)
}

/// One `{name, versions: [range]}` entry per dependency, sorted by name
pub fn packages_from_manifest(manifest: &Value) -> Result<Value, CliError> {
    let Some(dependencies) = manifest.get("dependencies") else {
        return Ok(Value::Array(Vec::new()));
    };
    let Value::Object(dependencies) = dependencies else {
        return Err(CliError::Manifest("dependencies must be an object".to_string()));
    };

    let packages = dependencies
        .iter()
        .map(|(name, range)| match range {
            Value::String(range) => Ok(json!({ "name": name, "versions": [range] })),
            _ => Err(CliError::Manifest(format!(
                "dependencies.{name} must be a version range string"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Value::Array(packages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_become_packages() {
        let manifest = json!({
            "name": "app",
            "dependencies": { "react": "^17.0.1", "react-dom": "17.0.1" }
        });
        let packages = packages_from_manifest(&manifest).unwrap();
        assert_eq!(
            packages,
            json!([
                { "name": "react", "versions": ["^17.0.1"] },
                { "name": "react-dom", "versions": ["17.0.1"] },
            ])
        );
    }

    #[test]
    fn test_missing_dependencies() {
        let packages = packages_from_manifest(&json!({ "name": "app" })).unwrap();
        assert_eq!(packages, json!([]));
    }

    #[test]
    fn test_non_string_range() {
        let manifest = json!({ "dependencies": { "react": 17 } });
        assert!(packages_from_manifest(&manifest).is_err());
    }

    #[tokio::test]
    async fn test_reads_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("package.json");
        std::fs::write(&path, r#"{ "dependencies": { "rxjs": "^7" } }"#).unwrap();

        let packages = packages_from_file(&path).await.unwrap();
        assert_eq!(packages[0]["name"], "rxjs");
    }
}
