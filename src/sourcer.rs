use std::path::Path;

use crate::config::{Options, Platform};
use crate::error::Result;
use crate::hash::{create_fingerprint_from_sources, Fingerprint, HashSource};

/// Decides which parts of a project are native-relevant.
pub trait Sourcer: Sync {
    fn hash_sources(&self, project_root: &Path, options: &Options) -> Result<Vec<HashSource>>;
}

impl<F> Sourcer for F
where
    F: Fn(&Path, &Options) -> Result<Vec<HashSource>> + Sync,
{
    fn hash_sources(&self, project_root: &Path, options: &Options) -> Result<Vec<HashSource>> {
        self(project_root, options)
    }
}

/// Native project directories of every enabled platform, the app manifest files, and any
/// `extra_sources` from the options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSourcer;

const MANIFEST_FILES: &[(&str, &str)] = &[("app.json", "expoConfig"), ("package.json", "packageJson")];

impl Sourcer for DefaultSourcer {
    fn hash_sources(&self, project_root: &Path, options: &Options) -> Result<Vec<HashSource>> {
        let mut sources = Vec::new();

        for platform in &options.platforms {
            let dir = match platform {
                Platform::Android => "android",
                Platform::Ios => "ios",
            };
            if project_root.join(dir).is_dir() {
                sources.push(HashSource::dir(dir, &["bareNativeDir"]));
            }
        }

        for (file, reason) in MANIFEST_FILES {
            if project_root.join(file).is_file() {
                sources.push(HashSource::file(*file, &[*reason]));
            }
        }

        sources.extend(options.extra_sources.iter().cloned());
        tracing::debug!("Default sourcer found {} sources", sources.len());
        Ok(sources)
    }
}

/// Fingerprint a project using a custom sourcer.
pub fn create_fingerprint_with<S: Sourcer + ?Sized>(
    sourcer: &S,
    project_root: &Path,
    options: &Options,
) -> Result<Fingerprint> {
    let sources = sourcer.hash_sources(project_root, options)?;
    create_fingerprint_from_sources(sources, project_root, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{normalize, RawOptions};
    use tempfile::TempDir;

    #[test]
    fn test_default_sourcer_finds_native_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("ios")).unwrap();
        std::fs::create_dir_all(root.join("android")).unwrap();
        std::fs::write(root.join("app.json"), "{}").unwrap();

        let options = normalize(
            root,
            &RawOptions {
                platforms: Some(vec!["ios".to_string()]),
                extra_sources: Some(vec![HashSource::contents("env", "A=1", &["env"])]),
                ..Default::default()
            },
        )
        .unwrap();

        let sources = DefaultSourcer.hash_sources(root, &options).unwrap();
        assert_eq!(
            sources,
            vec![
                HashSource::dir("ios", &["bareNativeDir"]),
                HashSource::file("app.json", &["expoConfig"]),
                HashSource::contents("env", "A=1", &["env"]),
            ]
        );
    }

    #[test]
    fn test_closure_sourcer() {
        let temp_dir = TempDir::new().unwrap();
        let options = normalize(temp_dir.path(), &RawOptions::default()).unwrap();
        let sourcer = |_: &Path, _: &Options| -> Result<Vec<HashSource>> {
            Ok(vec![HashSource::contents("foo", "HelloWorld", &["foo"])])
        };

        let fingerprint = create_fingerprint_with(&sourcer, temp_dir.path(), &options).unwrap();
        assert_eq!(fingerprint.sources.len(), 1);
        assert_eq!(
            fingerprint.sources[0].hash,
            "db8ac1c259eb89d4a131b253bacfca5f319d54f2"
        );
    }
}
