//! Build request validation
//!
//! Checks the raw request document field by field, in a fixed order, and
//! reports the first violation. Nothing here touches the network or the
//! filesystem.

use serde_json::{Map, Value};
use shdeps_errors::ConfigError;
use shdeps_types::{
    compile_globs, BuildRequest, FilterSet, PackageSpec, Severity, Version, VersionRange,
    VersionSpec, DEFAULT_OUTPUT_DIR,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const STRING_ARRAY: &str = "must be an array of strings, if defined";

/// Validate a raw build request and normalize it
///
/// # Errors
///
/// Returns the first violated constraint, naming the field path and the
/// expected shape.
pub fn validate(raw: &Value) -> Result<BuildRequest, ConfigError> {
    let empty = Map::new();
    let doc = raw.as_object().unwrap_or(&empty);

    let output_dir = match doc.get("outputDir") {
        None | Some(Value::Null) => DEFAULT_OUTPUT_DIR.to_string(),
        Some(Value::String(s)) if s.is_empty() => DEFAULT_OUTPUT_DIR.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ConfigError::invalid_field("outputDir", "must be a string")),
    };

    let Some(packages) = doc.get("packages").and_then(Value::as_array) else {
        return Err(ConfigError::invalid_field("packages", "must be an array"));
    };

    let clean = match doc.get("clean") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(ConfigError::invalid_field("clean", "must be a boolean")),
    };

    let absolute_dir = doc.get("absoluteDir").is_some_and(truthy);
    if clean && Path::new(&output_dir).is_absolute() && !absolute_dir {
        return Err(ConfigError::AbsoluteCleanRefused { path: output_dir });
    }

    let log_level = match doc.get("logLevel") {
        Some(value) if truthy(value) => value
            .as_str()
            .and_then(|s| Severity::from_str(s).ok())
            .ok_or_else(|| {
                ConfigError::invalid_field(
                    "logLevel",
                    r#"must be one of the following: "debug", "warn", "fatal""#,
                )
            })?,
        _ => Severity::Debug,
    };

    let skip_key = if doc.contains_key("skipMirrorUrl") {
        "skipMirrorUrl"
    } else {
        "skipPackagesAtUrl"
    };
    let skip_mirror_url = match doc.get(skip_key) {
        Some(value) if truthy(value) => Some(
            value
                .as_str()
                .ok_or_else(|| ConfigError::invalid_field(skip_key, "must be a string"))?
                .to_string(),
        ),
        _ => None,
    };

    let generate_deployment_file = doc
        .get("generateDeploymentFile")
        .or_else(|| doc.get("generateDockerfile"))
        .is_some_and(truthy);

    let packages = packages
        .iter()
        .enumerate()
        .map(|(i, p)| validate_package(i, p))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BuildRequest {
        output_dir: PathBuf::from(output_dir),
        clean,
        absolute_dir,
        log_level,
        skip_mirror_url,
        generate_deployment_file,
        packages,
    })
}

fn validate_package(index: usize, value: &Value) -> Result<PackageSpec, ConfigError> {
    let field = format!("packages[{index}]");
    let Some(package) = value.as_object() else {
        return Err(ConfigError::invalid_field(field, "must be an object"));
    };

    let Some(name) = package.get("name").and_then(Value::as_str) else {
        return Err(ConfigError::invalid_field(
            format!("{field}.name"),
            "must be a string",
        ));
    };

    let Some(versions) = package.get("versions").and_then(Value::as_array) else {
        return Err(ConfigError::invalid_field(
            format!("{field}.versions"),
            "must be an array",
        ));
    };

    let versions = versions
        .iter()
        .enumerate()
        .map(|(j, v)| validate_version(&format!("{field}.versions[{j}]"), v))
        .collect::<Result<Vec<_>, _>>()?;

    let filters = validate_filters(&field, package)?;

    Ok(PackageSpec {
        name: name.to_string(),
        versions,
        filters,
    })
}

fn validate_version(field: &str, value: &Value) -> Result<VersionSpec, ConfigError> {
    match value {
        Value::String(range) => VersionRange::from_str(range)
            .map(VersionSpec::Range)
            .map_err(|_| ConfigError::InvalidValue {
                field: field.to_string(),
                value: range.clone(),
            }),
        Value::Object(object) => {
            let version = object
                .get("version")
                .and_then(Value::as_str)
                .and_then(parse_exact)
                .ok_or_else(|| {
                    ConfigError::invalid_field(
                        format!("{field}.version"),
                        "must be a valid semver string",
                    )
                })?;
            let filters = validate_filters(field, object)?;
            Ok(VersionSpec::Exact { version, filters })
        }
        _ => Err(ConfigError::invalid_field(field, "must be a string or object")),
    }
}

/// Strict semver with at most one leading `v`
fn parse_exact(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    Version::parse(raw.strip_prefix('v').unwrap_or(raw)).ok()
}

fn validate_filters(field: &str, object: &Map<String, Value>) -> Result<FilterSet, ConfigError> {
    Ok(FilterSet {
        include: string_array(&format!("{field}.include"), object.get("include"))?,
        exclude: string_array(&format!("{field}.exclude"), object.get("exclude"))?,
    })
}

fn string_array(field: &str, value: Option<&Value>) -> Result<Option<Vec<String>>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let patterns = value
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(ToString::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| ConfigError::invalid_field(field, STRING_ARRAY))?;

    if let Err(e) = compile_globs(&patterns) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: e.to_string(),
        });
    }

    Ok(Some(patterns))
}

/// Loose truthiness for optional switches
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::InvalidField { field, .. } | ConfigError::InvalidValue { field, .. } => {
                field
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_defaults() {
        let request = validate(&json!({ "packages": [] })).unwrap();
        assert_eq!(request.output_dir, PathBuf::from("npm"));
        assert!(!request.clean);
        assert_eq!(request.log_level, Severity::Debug);
        assert!(request.skip_mirror_url.is_none());
        assert!(!request.generate_deployment_file);

        let request = validate(&json!({ "packages": [], "outputDir": "" })).unwrap();
        assert_eq!(request.output_dir, PathBuf::from("npm"));
    }

    #[test]
    fn test_checks_run_in_order() {
        // outputDir is reported before packages
        let err = validate(&json!({ "outputDir": 5 })).unwrap_err();
        assert_eq!(field_of(err), "outputDir");

        let err = validate(&json!({ "packages": {} })).unwrap_err();
        assert_eq!(field_of(err), "packages");

        let err = validate(&json!({ "packages": [], "clean": "yes" })).unwrap_err();
        assert_eq!(field_of(err), "clean");

        let err = validate(&json!({ "packages": [], "logLevel": "info" })).unwrap_err();
        assert_eq!(field_of(err), "logLevel");

        let err = validate(&json!({ "packages": [], "skipMirrorUrl": 1 })).unwrap_err();
        assert_eq!(field_of(err), "skipMirrorUrl");
    }

    #[test]
    fn test_absolute_clean_requires_opt_in() {
        let err = validate(&json!({
            "outputDir": "/var/www/npm",
            "clean": true,
            "packages": []
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::AbsoluteCleanRefused { .. }));

        let request = validate(&json!({
            "outputDir": "/var/www/npm",
            "clean": true,
            "absoluteDir": true,
            "packages": []
        }))
        .unwrap();
        assert!(request.clean);
        assert!(request.absolute_dir);
    }

    #[test]
    fn test_package_shapes() {
        let err = validate(&json!({ "packages": ["react"] })).unwrap_err();
        assert_eq!(field_of(err), "packages[0]");

        let err = validate(&json!({ "packages": [{ "versions": [] }] })).unwrap_err();
        assert_eq!(field_of(err), "packages[0].name");

        let err = validate(&json!({ "packages": [{ "name": "react", "versions": "17" }] }))
            .unwrap_err();
        assert_eq!(field_of(err), "packages[0].versions");

        let err = validate(&json!({
            "packages": [{ "name": "react", "versions": ["17", 17] }]
        }))
        .unwrap_err();
        assert_eq!(field_of(err), "packages[0].versions[1]");

        let err = validate(&json!({
            "packages": [{ "name": "react", "versions": [{ "version": "17" }] }]
        }))
        .unwrap_err();
        assert_eq!(field_of(err), "packages[0].versions[0].version");

        let err = validate(&json!({
            "packages": [{ "name": "react", "versions": [], "include": [1] }]
        }))
        .unwrap_err();
        assert_eq!(field_of(err), "packages[0].include");
    }

    #[test]
    fn test_exact_version_prefixes() {
        let exact = |version: &str| {
            validate(&json!({
                "packages": [{ "name": "react", "versions": [{ "version": version }] }]
            }))
        };

        for accepted in ["17.0.1", "v17.0.1", " 17.0.1 "] {
            let request = exact(accepted).unwrap();
            assert!(matches!(
                &request.packages[0].versions[0],
                VersionSpec::Exact { version, .. } if *version == Version::new(17, 0, 1)
            ));
        }

        for rejected in ["=17.0.1", "vv17.0.1", "v=17.0.1"] {
            let err = exact(rejected).unwrap_err();
            assert_eq!(field_of(err), "packages[0].versions[0].version", "{rejected}");
        }
    }

    #[test]
    fn test_invalid_range_and_glob() {
        let err = validate(&json!({
            "packages": [{ "name": "react", "versions": [">=banana"] }]
        }))
        .unwrap_err();
        assert_eq!(field_of(err), "packages[0].versions[0]");

        let err = validate(&json!({
            "packages": [{ "name": "react", "versions": ["17"], "exclude": ["src/["] }]
        }))
        .unwrap_err();
        assert_eq!(field_of(err), "packages[0].exclude");
    }

    #[test]
    fn test_full_request() {
        let request = validate(&json!({
            "outputDir": "public/npm",
            "clean": true,
            "logLevel": "warn",
            "skipPackagesAtUrl": "https://cdn.example.com/npm/",
            "generateDockerfile": true,
            "packages": [
                {
                    "name": "react",
                    "include": ["umd/**"],
                    "versions": [">= 17", { "version": "16.14.0", "exclude": ["**/*.map"] }]
                }
            ]
        }))
        .unwrap();

        assert_eq!(request.output_dir, PathBuf::from("public/npm"));
        assert_eq!(request.log_level, Severity::Warn);
        assert_eq!(
            request.skip_mirror_url.as_deref(),
            Some("https://cdn.example.com/npm/")
        );
        assert!(request.generate_deployment_file);

        let react = &request.packages[0];
        assert_eq!(react.name, "react");
        assert_eq!(react.filters.include, Some(vec!["umd/**".to_string()]));
        assert!(matches!(react.versions[0], VersionSpec::Range(_)));
        assert!(matches!(react.versions[1], VersionSpec::Exact { .. }));
    }
}
