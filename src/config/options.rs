use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::loader::load_ignore_file;
use super::schema::RawOptions;
use crate::error::ConfigError;
use crate::hash::HashSource;
use crate::utils::{normalize_relative, HashAlgorithm};

/// Build outputs and caches that never describe native project state.
pub const DEFAULT_IGNORE_PATHS: &[&str] = &[
    "android/build",
    "android/app/build",
    "android/app/.cxx",
    "android/.gradle",
    "android/local.properties",
    "ios/Pods",
    "ios/build",
    "ios/.xcode.env.local",
    "ios/**/xcuserdata",
    "ios/**/*.xcworkspace/xcshareddata/swiftpm",
    "**/node_modules/**/android/build",
    "**/node_modules/**/android/.cxx",
    "**/node_modules/**/android/.gradle",
    "**/.DS_Store",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|platform| platform.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownPlatform(s.to_string()))
    }
}

/// Compiled `ignore_paths`, matched against POSIX project-relative paths, case sensitive.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    set: GlobSet,
}

impl IgnoreMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| ConfigError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
            source,
        })?;
        Ok(Self { set })
    }

    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.set.is_match(relative_path)
    }
}

/// Validated options for one fingerprint run. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Options {
    pub hash_algorithm: HashAlgorithm,
    pub ignore_paths: Vec<String>,
    pub platforms: Vec<Platform>,
    pub debug: bool,
    pub enable_react_imports_patcher: bool,
    pub concurrency: usize,
    pub extra_sources: Vec<HashSource>,
    #[serde(skip)]
    ignore_matcher: IgnoreMatcher,
}

impl Options {
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.ignore_matcher.is_ignored(relative_path)
    }

    pub fn has_platform(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }
}

/// Validate `raw` and apply defaults.
///
/// `ignore_paths` is assembled from [`DEFAULT_IGNORE_PATHS`], then `raw.ignore_paths`, then the
/// project's `.fingerprintignore`. A `!pattern` entry drops earlier identical patterns.
pub fn normalize(project_root: &Path, raw: &RawOptions) -> Result<Options, ConfigError> {
    let hash_algorithm = match &raw.hash_algorithm {
        Some(name) => name.parse()?,
        None => HashAlgorithm::default(),
    };

    let concurrency = match raw.concurrency {
        Some(n) if n < 1 => return Err(ConfigError::InvalidConcurrency(n)),
        Some(n) => usize::try_from(n).map_err(|_| ConfigError::InvalidConcurrency(n))?,
        None => num_cpus::get().max(1),
    };

    let platforms = match &raw.platforms {
        Some(names) => {
            let mut platforms = names
                .iter()
                .map(|name| name.parse())
                .collect::<Result<Vec<Platform>, _>>()?;
            platforms.sort();
            platforms.dedup();
            platforms
        }
        None => Platform::ALL.to_vec(),
    };

    let enable_react_imports_patcher = raw
        .enable_react_imports_patcher
        .unwrap_or_else(|| platforms.contains(&Platform::Ios));

    let mut patterns: Vec<String> = DEFAULT_IGNORE_PATHS.iter().map(|p| p.to_string()).collect();
    patterns.extend(raw.ignore_paths.iter().flatten().cloned());
    patterns.extend(load_ignore_file(project_root)?);
    let ignore_paths = resolve_negations(patterns);
    let ignore_matcher = IgnoreMatcher::new(&ignore_paths)?;

    let extra_sources = raw
        .extra_sources
        .iter()
        .flatten()
        .cloned()
        .map(normalize_source_path)
        .collect();

    Ok(Options {
        hash_algorithm,
        ignore_paths,
        platforms,
        debug: raw.debug.unwrap_or(false),
        enable_react_imports_patcher,
        concurrency,
        extra_sources,
        ignore_matcher,
    })
}

fn resolve_negations(patterns: Vec<String>) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            continue;
        }
        if let Some(negated) = pattern.strip_prefix('!') {
            let negated = negated.replace('\\', "/");
            resolved.retain(|existing| *existing != negated);
        } else {
            let pattern = pattern.replace('\\', "/");
            if !resolved.contains(&pattern) {
                resolved.push(pattern);
            }
        }
    }
    resolved
}

/// Normalize the path of a file or directory source.
pub fn normalize_source_path(source: HashSource) -> HashSource {
    match source {
        HashSource::File { file_path, reasons } => HashSource::File {
            file_path: normalize_relative(&file_path),
            reasons,
        },
        HashSource::Dir { file_path, reasons } => HashSource::Dir {
            file_path: normalize_relative(&file_path),
            reasons,
        },
        contents @ HashSource::Contents { .. } => contents,
    }
}
