use std::path::Path;

use super::options::{normalize, Options};
use super::schema::RawOptions;
use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "fingerprint.toml";
pub const IGNORE_FILE_NAME: &str = ".fingerprintignore";

/// Load raw options from a TOML file
pub fn load_config(path: &Path) -> Result<RawOptions, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `fingerprint.toml` from the project root, if there is one
pub fn find_config(project_root: &Path) -> Result<Option<RawOptions>, ConfigError> {
    let config_path = project_root.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Ok(None);
    }
    load_config(&config_path).map(Some)
}

/// Patterns listed in the project's `.fingerprintignore`, one per line.
/// Blank lines and `#` comments are skipped. A missing file yields no patterns.
pub fn load_ignore_file(project_root: &Path) -> Result<Vec<String>, ConfigError> {
    let ignore_path = project_root.join(IGNORE_FILE_NAME);
    let content = match std::fs::read_to_string(&ignore_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: ignore_path,
                source,
            })
        }
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Resolve the options for a project: `fingerprint.toml` first, `overrides` on top, then
/// validated by [`normalize`].
pub fn load_options(project_root: &Path, overrides: RawOptions) -> Result<Options, ConfigError> {
    let raw = match find_config(project_root)? {
        Some(file) => {
            tracing::debug!("Loaded {}", project_root.join(CONFIG_FILE_NAME).display());
            file.merge(overrides)
        }
        None => overrides,
    };
    normalize(project_root, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::HashAlgorithm;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_are_fine() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_config(temp_dir.path()).unwrap().is_none());
        assert!(load_ignore_file(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_config_file_is_layered_under_overrides() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "hash_algorithm = \"sha256\"\nconcurrency = 2\nignore_paths = [\"ios/Generated\"]\n",
        )
        .unwrap();

        let options = load_options(
            temp_dir.path(),
            RawOptions {
                concurrency: Some(1),
                ignore_paths: Some(vec!["android/generated".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(options.hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(options.concurrency, 1);
        assert!(options.is_ignored("ios/Generated"));
        assert!(options.is_ignored("android/generated"));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "platforms = 3").unwrap();

        let err = find_config(temp_dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_ignore_file_skips_comments() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(IGNORE_FILE_NAME),
            "# comment\n\n  ios/Generated/**/*  \n!ios/Pods\n",
        )
        .unwrap();

        assert_eq!(
            load_ignore_file(temp_dir.path()).unwrap(),
            vec!["ios/Generated/**/*".to_string(), "!ios/Pods".to_string()]
        );
    }
}
