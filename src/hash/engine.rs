use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use walkdir::WalkDir;

use super::dedup::dedup_sources;
use super::limiter::Limiter;
use super::patcher::{react_headers, should_patch, PatchedReader, CHUNK_SIZE};
use super::source::{DebugInfo, Fingerprint, FingerprintSource, HashSource};
use crate::config::Options;
use crate::error::{FingerprintError, Result};
use crate::utils::{digest_entries, digest_hex, join_posix, HashAlgorithm};

/// Digest of one resolved file, directory or inline source.
struct Resolved {
    id: String,
    hash: String,
    debug_info: Option<DebugInfo>,
}

/// Everything a resolution needs, shared by every task of one run.
struct HashContext<'a> {
    project_root: &'a Path,
    options: &'a Options,
    limiter: &'a Limiter,
}

impl HashContext<'_> {
    fn resolve(&self, source: &HashSource) -> Result<Option<Resolved>> {
        match source {
            HashSource::Contents { id, contents, .. } => {
                let hash = digest_hex(self.options.hash_algorithm, contents);
                let debug_info = self.options.debug.then(|| DebugInfo {
                    hash: hash.clone(),
                    path: None,
                    is_transformed: None,
                    children: Vec::new(),
                });
                Ok(Some(Resolved {
                    id: id.clone(),
                    hash,
                    debug_info,
                }))
            }
            HashSource::File { file_path, .. } => self.hash_file(file_path),
            HashSource::Dir { file_path, .. } => self.hash_dir(file_path),
        }
    }

    fn hash_file(&self, file_path: &str) -> Result<Option<Resolved>> {
        if self.options.is_ignored(file_path) {
            tracing::debug!("Ignoring file {}", file_path);
            return Ok(None);
        }

        let path = self.project_root.join(file_path);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Skipping missing file {}", file_path);
                return Ok(None);
            }
            Err(e) => return Err(FingerprintError::io(path, e)),
        };

        let transformed = should_patch(self.options, file_path);
        let digest = if transformed {
            digest_reader(
                self.options.hash_algorithm,
                PatchedReader::new(file, react_headers()),
            )
        } else {
            digest_reader(self.options.hash_algorithm, file)
        };
        let hash = digest.map_err(|e| FingerprintError::io(&path, e))?;

        let debug_info = self.options.debug.then(|| DebugInfo {
            hash: hash.clone(),
            path: Some(file_path.to_string()),
            is_transformed: transformed.then_some(true),
            children: Vec::new(),
        });

        Ok(Some(Resolved {
            id: file_path.to_string(),
            hash,
            debug_info,
        }))
    }

    fn hash_dir(&self, dir_path: &str) -> Result<Option<Resolved>> {
        if self.options.is_ignored(dir_path) {
            tracing::debug!("Ignoring directory {}", dir_path);
            return Ok(None);
        }

        let path = self.project_root.join(dir_path);
        match std::fs::metadata(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Skipping missing directory {}", dir_path);
                return Ok(None);
            }
            Err(e) => return Err(FingerprintError::io(path, e)),
        }

        let mut children = Vec::new();
        for entry in WalkDir::new(&path).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let failed = e.path().unwrap_or(path.as_path()).to_path_buf();
                FingerprintError::io(failed, io::Error::from(e))
            })?;
            let Some(name) = entry.file_name().to_str() else {
                return Err(FingerprintError::io(
                    entry.path(),
                    io::Error::new(io::ErrorKind::InvalidData, "file name is not valid UTF-8"),
                ));
            };
            let child_path = join_posix(dir_path, name);
            let file_type = entry.file_type();
            if file_type.is_dir() {
                children.push(HashSource::Dir {
                    file_path: child_path,
                    reasons: Vec::new(),
                });
            } else if file_type.is_file() {
                children.push(HashSource::File {
                    file_path: child_path,
                    reasons: Vec::new(),
                });
            }
        }

        let mut resolved = self
            .limiter
            .map(&children, |child| self.resolve(child))
            .into_iter()
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        if resolved.is_empty() {
            tracing::debug!("Directory {} has nothing to hash", dir_path);
            return Ok(None);
        }

        resolved.sort_by(|a, b| a.id.cmp(&b.id));
        let hash = digest_entries(
            self.options.hash_algorithm,
            resolved.iter().map(|child| (child.id.as_str(), child.hash.as_str())),
        );

        let debug_info = self.options.debug.then(|| DebugInfo {
            hash: hash.clone(),
            path: Some(dir_path.to_string()),
            is_transformed: None,
            children: resolved
                .iter_mut()
                .filter_map(|child| child.debug_info.take())
                .collect(),
        });

        Ok(Some(Resolved {
            id: dir_path.to_string(),
            hash,
            debug_info,
        }))
    }
}

fn digest_reader<R: Read>(algorithm: HashAlgorithm, mut reader: R) -> io::Result<String> {
    let mut hasher = algorithm.hasher();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(hasher.finalize_hex())
}

/// Resolve one source into its digest.
///
/// Returns `None` when the source is excluded by `ignore_paths`, does not exist, or is a
/// directory with nothing left to hash. Any other read failure is an error.
pub fn resolve_source(
    source: &HashSource,
    project_root: &Path,
    options: &Options,
    limiter: &Limiter,
) -> Result<Option<FingerprintSource>> {
    let context = HashContext {
        project_root,
        options,
        limiter,
    };
    Ok(context
        .resolve(source)?
        .map(|resolved| FingerprintSource {
            source: source.clone(),
            hash: resolved.hash,
            debug_info: resolved.debug_info,
        }))
}

/// Fold per-source digests into the fingerprint digest.
///
/// Sources are ordered by identity (plain byte order) first, so the result only depends on
/// the set of `(id, hash)` pairs.
pub fn fold(sources: &[FingerprintSource], algorithm: HashAlgorithm) -> String {
    let mut entries: Vec<(&str, &str)> = sources
        .iter()
        .map(|source| (source.id(), source.hash.as_str()))
        .collect();
    entries.sort_unstable();
    digest_entries(algorithm, entries)
}

/// Hash a list of sources into a [`Fingerprint`].
///
/// Duplicate identities are merged first. Sources that resolve to nothing are dropped; any
/// read failure aborts the whole run.
pub fn create_fingerprint_from_sources(
    sources: Vec<HashSource>,
    project_root: &Path,
    options: &Options,
) -> Result<Fingerprint> {
    let sources = dedup_sources(sources)?;
    let limiter = Limiter::new(options.concurrency)?;
    tracing::debug!(
        "Hashing {} sources with {} workers",
        sources.len(),
        limiter.concurrency()
    );

    let mut resolved = limiter
        .map(&sources, |source| {
            resolve_source(source, project_root, options, &limiter)
        })
        .into_iter()
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    resolved.sort_by(|a, b| a.id().cmp(b.id()));
    let hash = fold(&resolved, options.hash_algorithm);
    tracing::info!(
        "Fingerprint {} from {} of {} sources",
        hash,
        resolved.len(),
        sources.len()
    );

    Ok(Fingerprint {
        hash,
        sources: resolved,
    })
}
