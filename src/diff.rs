use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Options;
use crate::error::Result;
use crate::hash::{Fingerprint, FingerprintSource};
use crate::sourcer::{create_fingerprint_with, Sourcer};

/// One difference between two fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum FingerprintDiffItem {
    /// Present only in the new fingerprint
    Added { source: FingerprintSource },
    /// Present only in the old fingerprint
    Removed { source: FingerprintSource },
    /// Present in both with a different hash
    Changed {
        before: FingerprintSource,
        after: FingerprintSource,
    },
}

impl FingerprintDiffItem {
    pub fn id(&self) -> &str {
        match self {
            FingerprintDiffItem::Added { source } | FingerprintDiffItem::Removed { source } => {
                source.id()
            }
            FingerprintDiffItem::Changed { after, .. } => after.id(),
        }
    }

    /// The current state of the source, absent for removals.
    pub fn current(&self) -> Option<&FingerprintSource> {
        match self {
            FingerprintDiffItem::Added { source } => Some(source),
            FingerprintDiffItem::Changed { after, .. } => Some(after),
            FingerprintDiffItem::Removed { .. } => None,
        }
    }
}

/// Compare two fingerprints by source identity. Items come back ordered by identity.
pub fn diff_fingerprints(old: &Fingerprint, new: &Fingerprint) -> Vec<FingerprintDiffItem> {
    let before: BTreeMap<&str, &FingerprintSource> =
        old.sources.iter().map(|source| (source.id(), source)).collect();
    let after: BTreeMap<&str, &FingerprintSource> =
        new.sources.iter().map(|source| (source.id(), source)).collect();

    let mut items = Vec::new();
    for (id, current) in &after {
        match before.get(id) {
            None => items.push(FingerprintDiffItem::Added {
                source: (*current).clone(),
            }),
            Some(previous) if previous.hash != current.hash => {
                items.push(FingerprintDiffItem::Changed {
                    before: (*previous).clone(),
                    after: (*current).clone(),
                })
            }
            Some(_) => {}
        }
    }
    for (id, previous) in &before {
        if !after.contains_key(id) {
            items.push(FingerprintDiffItem::Removed {
                source: (*previous).clone(),
            });
        }
    }

    items.sort_by(|a, b| a.id().cmp(b.id()));
    items
}

/// Recompute the fingerprint of `project_root` and compare `fingerprint` against it.
pub fn diff_fingerprint_changes_with<S: Sourcer + ?Sized>(
    sourcer: &S,
    fingerprint: &Fingerprint,
    project_root: &Path,
    options: &Options,
) -> Result<Vec<FingerprintDiffItem>> {
    let current = create_fingerprint_with(sourcer, project_root, options)?;
    Ok(diff_fingerprints(fingerprint, &current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashSource;

    fn source(id: &str, hash: &str) -> FingerprintSource {
        FingerprintSource {
            source: HashSource::file(id, &["test"]),
            hash: hash.to_string(),
            debug_info: None,
        }
    }

    fn fingerprint(sources: Vec<FingerprintSource>) -> Fingerprint {
        Fingerprint {
            hash: String::new(),
            sources,
        }
    }

    #[test]
    fn test_reports_added_changed_and_removed() {
        let old = fingerprint(vec![source("a", "1"), source("b", "2"), source("c", "3")]);
        let new = fingerprint(vec![source("d", "4"), source("b", "20"), source("a", "1")]);

        let items = diff_fingerprints(&old, &new);
        assert_eq!(
            items,
            vec![
                FingerprintDiffItem::Changed {
                    before: source("b", "2"),
                    after: source("b", "20"),
                },
                FingerprintDiffItem::Removed {
                    source: source("c", "3")
                },
                FingerprintDiffItem::Added {
                    source: source("d", "4")
                },
            ]
        );
        assert_eq!(items[0].current().unwrap().reasons(), ["test".to_string()]);
        assert!(items[1].current().is_none());
    }

    #[test]
    fn test_identical_fingerprints_have_no_diff() {
        let old = fingerprint(vec![source("a", "1"), source("b", "2")]);
        let new = fingerprint(vec![source("b", "2"), source("a", "1")]);
        assert!(diff_fingerprints(&old, &new).is_empty());
    }

    #[test]
    fn test_diff_item_json_is_tagged() {
        let item = FingerprintDiffItem::Added {
            source: source("ios", "1"),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["op"], "added");
        assert_eq!(json["source"]["filePath"], "ios");
    }
}
