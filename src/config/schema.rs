use serde::{Deserialize, Serialize};

use crate::hash::HashSource;

/// Unvalidated options, as read from `fingerprint.toml` or assembled by a caller.
///
/// Every field is optional; [`crate::config::normalize`] fills in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawOptions {
    /// Digest algorithm name (`sha1`, `sha256`, `sha512`, `xxh3`)
    #[serde(default)]
    pub hash_algorithm: Option<String>,

    /// Glob patterns, relative to the project root, excluded from hashing
    #[serde(default)]
    pub ignore_paths: Option<Vec<String>>,

    /// Platforms to fingerprint (`ios`, `android`)
    #[serde(default)]
    pub platforms: Option<Vec<String>>,

    /// Attach debug info to every resolved source
    #[serde(default)]
    pub debug: Option<bool>,

    /// Normalize React header imports before hashing iOS sources
    #[serde(default)]
    pub enable_react_imports_patcher: Option<bool>,

    /// Maximum number of concurrent hashing workers
    #[serde(default)]
    pub concurrency: Option<i64>,

    /// Additional sources appended by the default sourcer
    #[serde(default)]
    pub extra_sources: Option<Vec<HashSource>>,
}

impl RawOptions {
    /// Layer `overrides` on top of `self`. Scalars are replaced, lists are concatenated.
    pub fn merge(self, overrides: RawOptions) -> RawOptions {
        RawOptions {
            hash_algorithm: overrides.hash_algorithm.or(self.hash_algorithm),
            ignore_paths: concat(self.ignore_paths, overrides.ignore_paths),
            platforms: overrides.platforms.or(self.platforms),
            debug: overrides.debug.or(self.debug),
            enable_react_imports_patcher: overrides
                .enable_react_imports_patcher
                .or(self.enable_react_imports_patcher),
            concurrency: overrides.concurrency.or(self.concurrency),
            extra_sources: concat(self.extra_sources, overrides.extra_sources),
        }
    }

    /// Generate default TOML content
    pub fn default_toml() -> String {
        r#"# Digest used for every source: sha1, sha256, sha512 or xxh3
hash_algorithm = "sha1"

# Platforms whose native state is fingerprinted
platforms = ["ios", "android"]

# Extra glob patterns to exclude (build outputs and caches are excluded already).
# Prefix a pattern with "!" to opt back in to one of the defaults.
ignore_paths = [
    # "ios/MyApp/Generated/**/*",
]

# Rewrite `#import "RCTBridge.h"` style includes to `<React/RCTBridge.h>` before hashing
# enable_react_imports_patcher = true

# Attach per-source debug info to the fingerprint
debug = false

# concurrency = 8

# [[extra_sources]]
# type = "file"
# file_path = "eas.json"
# reasons = ["easBuild"]
"#
        .to_string()
    }
}

fn concat<T>(base: Option<Vec<T>>, extra: Option<Vec<T>>) -> Option<Vec<T>> {
    match (base, extra) {
        (Some(mut base), Some(extra)) => {
            base.extend(extra);
            Some(base)
        }
        (base, None) => base,
        (None, extra) => extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toml_parses() {
        let raw: RawOptions = toml::from_str(&RawOptions::default_toml()).unwrap();
        assert_eq!(raw.hash_algorithm.as_deref(), Some("sha1"));
        assert_eq!(raw.platforms, Some(vec!["ios".to_string(), "android".to_string()]));
        assert_eq!(raw.ignore_paths, Some(vec![]));
        assert_eq!(raw.concurrency, None);
    }

    #[test]
    fn test_merge_overrides_scalars_and_concats_lists() {
        let file = RawOptions {
            hash_algorithm: Some("sha256".to_string()),
            ignore_paths: Some(vec!["a/**".to_string()]),
            debug: Some(true),
            ..Default::default()
        };
        let cli = RawOptions {
            hash_algorithm: Some("xxh3".to_string()),
            ignore_paths: Some(vec!["b/**".to_string()]),
            ..Default::default()
        };

        let merged = file.merge(cli);
        assert_eq!(merged.hash_algorithm.as_deref(), Some("xxh3"));
        assert_eq!(
            merged.ignore_paths,
            Some(vec!["a/**".to_string(), "b/**".to_string()])
        );
        assert_eq!(merged.debug, Some(true));
    }

    #[test]
    fn test_extra_sources_from_toml() {
        let raw: RawOptions = toml::from_str(
            r#"
            [[extra_sources]]
            type = "file"
            file_path = "eas.json"
            reasons = ["easBuild"]

            [[extra_sources]]
            type = "contents"
            id = "env"
            contents = "RELEASE=1"
            "#,
        )
        .unwrap();

        let sources = raw.extra_sources.unwrap();
        assert_eq!(sources[0], HashSource::file("eas.json", &["easBuild"]));
        assert_eq!(sources[1], HashSource::contents("env", "RELEASE=1", &[]));
    }
}
