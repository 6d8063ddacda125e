//! Property tests for version resolution

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use shdeps_registry::Packument;
    use shdeps_resolver::*;
    use shdeps_types::{PackageSpec, VersionRange, VersionSpec};
    use std::str::FromStr;

    fn packument(versions: &[(u64, u64, u64)]) -> Packument {
        let map: serde_json::Map<String, serde_json::Value> = versions
            .iter()
            .map(|(a, b, c)| {
                let key = format!("{a}.{b}.{c}");
                let dist = serde_json::json!({ "dist": { "tarball": format!("https://r/{key}.tgz") } });
                (key, dist)
            })
            .collect();
        serde_json::from_value(serde_json::json!({ "versions": map })).unwrap()
    }

    proptest! {
        #[test]
        fn matched_versions_are_an_ordered_subsequence(
            versions in proptest::collection::vec((0u64..5, 0u64..5, 0u64..5), 1..20),
            floor in 0u64..5,
        ) {
            let doc = packument(&versions);
            let spec = PackageSpec::new(
                "pkg",
                vec![VersionSpec::Range(VersionRange::from_str(&format!(">={floor}")).unwrap())],
            );

            let matched = matching_versions(&spec, &doc);
            let keys: Vec<&str> = doc.version_keys().collect();

            // Every match satisfies the range and appears in document order
            let mut cursor = 0;
            for m in &matched {
                let major: u64 = m.split('.').next().unwrap().parse().unwrap();
                prop_assert!(major >= floor);
                let pos = keys[cursor..].iter().position(|k| k == m);
                prop_assert!(pos.is_some());
                cursor += pos.unwrap() + 1;
            }

            // Nothing that satisfies the range is left out
            let expected = keys
                .iter()
                .filter(|k| k.split('.').next().unwrap().parse::<u64>().unwrap() >= floor)
                .count();
            prop_assert_eq!(matched.len(), expected);
        }
    }
}
