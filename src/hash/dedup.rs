use std::collections::HashMap;

use super::source::HashSource;
use crate::config::normalize_source_path;
use crate::error::{FingerprintError, Result};
use crate::utils::is_descendant;

/// Make source identities unique.
///
/// Sources sharing an identity are merged, keeping the first one and appending any reasons it
/// did not have yet. An identity listed with different kinds, or as inline contents with
/// different bytes, is an error. Files and directories that sit below a listed directory are folded into
/// the outermost such directory, since its digest already covers them.
pub fn dedup_sources(sources: Vec<HashSource>) -> Result<Vec<HashSource>> {
    let mut merged: Vec<HashSource> = Vec::with_capacity(sources.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for source in sources.into_iter().map(normalize_source_path) {
        match positions.get(source.id()) {
            Some(&index) => {
                let existing = &mut merged[index];
                if existing.kind() != source.kind() {
                    tracing::debug!(
                        "Source `{}` listed as both {} and {}",
                        source.id(),
                        existing.kind(),
                        source.kind()
                    );
                    return Err(FingerprintError::DuplicateSource {
                        id: source.id().to_string(),
                    });
                }
                if let (
                    HashSource::Contents { contents: a, .. },
                    HashSource::Contents { contents: b, .. },
                ) = (&*existing, &source)
                {
                    if a != b {
                        return Err(FingerprintError::DuplicateSource {
                            id: source.id().to_string(),
                        });
                    }
                }
                merge_reasons(existing, source.reasons());
            }
            None => {
                positions.insert(source.id().to_string(), merged.len());
                merged.push(source);
            }
        }
    }

    let dirs: Vec<String> = merged
        .iter()
        .filter(|source| matches!(source, HashSource::Dir { .. }))
        .map(|source| source.id().to_string())
        .collect();

    let mut folded: Vec<(usize, Vec<String>)> = Vec::new();
    let mut kept = Vec::with_capacity(merged.len());
    for source in merged {
        let outermost = source.file_path().and_then(|path| {
            dirs.iter()
                .filter(|dir| is_descendant(path, dir))
                .min_by_key(|dir| dir.len())
        });
        match outermost {
            Some(dir) => {
                tracing::debug!("Folding `{}` into directory `{}`", source.id(), dir);
                let index = positions[dir.as_str()];
                folded.push((index, source.reasons().to_vec()));
            }
            None => kept.push((positions[source.id()], source)),
        }
    }

    for (index, reasons) in folded {
        if let Some((_, dir)) = kept.iter_mut().find(|(position, _)| *position == index) {
            merge_reasons(dir, &reasons);
        }
    }

    Ok(kept.into_iter().map(|(_, source)| source).collect())
}

fn merge_reasons(source: &mut HashSource, reasons: &[String]) {
    let existing = source.reasons_mut();
    for reason in reasons {
        if !existing.contains(reason) {
            existing.push(reason.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_duplicate_identities() {
        let sources = vec![
            HashSource::file("app.json", &["expoConfig"]),
            HashSource::dir("ios", &["bareNativeDir"]),
            HashSource::file("./app.json", &["expoConfig", "easBuild"]),
        ];

        let deduped = dedup_sources(sources).unwrap();
        assert_eq!(
            deduped,
            vec![
                HashSource::file("app.json", &["expoConfig", "easBuild"]),
                HashSource::dir("ios", &["bareNativeDir"]),
            ]
        );
    }

    #[test]
    fn test_folds_nested_sources_into_outermost_dir() {
        let sources = vec![
            HashSource::file("ios/Podfile", &["podfile"]),
            HashSource::dir("ios/App", &["appTarget"]),
            HashSource::dir("ios", &["bareNativeDir"]),
            HashSource::dir("ios-extra", &["other"]),
        ];

        let deduped = dedup_sources(sources).unwrap();
        assert_eq!(
            deduped,
            vec![
                HashSource::dir("ios", &["bareNativeDir", "podfile", "appTarget"]),
                HashSource::dir("ios-extra", &["other"]),
            ]
        );
    }

    #[test]
    fn test_identical_contents_merge() {
        let sources = vec![
            HashSource::contents("config", "{}", &["a"]),
            HashSource::contents("config", "{}", &["b"]),
        ];
        let deduped = dedup_sources(sources).unwrap();
        assert_eq!(deduped, vec![HashSource::contents("config", "{}", &["a", "b"])]);
    }

    #[test]
    fn test_conflicting_contents_fail() {
        let sources = vec![
            HashSource::contents("config", "{}", &[]),
            HashSource::contents("config", "{\"a\":1}", &[]),
        ];
        let err = dedup_sources(sources).unwrap_err();
        assert!(matches!(err, FingerprintError::DuplicateSource { id } if id == "config"));
    }

    #[test]
    fn test_conflicting_kinds_fail_in_any_order() {
        let sources = vec![
            HashSource::file("app.json", &["expoConfig"]),
            HashSource::contents("app.json", "{}", &["expoConfig"]),
        ];
        let mut reversed = sources.clone();
        reversed.reverse();

        for list in [sources, reversed] {
            let err = dedup_sources(list).unwrap_err();
            assert!(matches!(err, FingerprintError::DuplicateSource { id } if id == "app.json"));
        }

        let err = dedup_sources(vec![
            HashSource::dir("ios", &[]),
            HashSource::file("ios", &[]),
        ])
        .unwrap_err();
        assert!(matches!(err, FingerprintError::DuplicateSource { id } if id == "ios"));
    }
}
