use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use native_fingerprint::RawOptions;

#[derive(Parser)]
#[command(
    name = "native-fingerprint",
    author = "esengine",
    version,
    about = "Fingerprint the native state of a mobile app project",
    long_about = "Native Fingerprint - decide whether a native build can be reused.\n\n\
                  Hashes the native project directories, manifests and configured sources\n\
                  of an app into one deterministic digest, and diffs stored fingerprints\n\
                  against the current project."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a fingerprint.toml configuration file in the project root
    Init {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Compute the full fingerprint of a project as JSON
    Fingerprint {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Write the fingerprint to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: FingerprintArgs,
    },

    /// Print only the fingerprint hash of a project
    Hash {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,

        #[command(flatten)]
        options: FingerprintArgs,
    },

    /// Compare a stored fingerprint with the current project
    Diff {
        /// Fingerprint JSON file produced by the `fingerprint` command
        fingerprint: PathBuf,

        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Print the changes as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: FingerprintArgs,
    },
}

#[derive(Args, Clone, Default)]
pub struct FingerprintArgs {
    /// Hash algorithm (sha1, sha256, sha512, xxh3)
    #[arg(short, long, env = "FINGERPRINT_HASH_ALGORITHM")]
    pub algorithm: Option<String>,

    /// Extra glob pattern to exclude, relative to the project root (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_paths: Vec<String>,

    /// Platform to fingerprint (repeatable, default: all)
    #[arg(short, long = "platform", value_name = "PLATFORM")]
    pub platforms: Vec<String>,

    /// Attach debug info to every source
    #[arg(long)]
    pub debug: bool,

    /// Hash iOS sources verbatim instead of normalizing React header imports
    #[arg(long)]
    pub no_react_imports_patcher: bool,

    /// Number of parallel hashing jobs
    #[arg(short, long, env = "FINGERPRINT_CONCURRENCY")]
    pub jobs: Option<i64>,
}

impl FingerprintArgs {
    /// Options given on the command line; anything unset falls back to fingerprint.toml.
    pub fn to_raw_options(&self) -> RawOptions {
        RawOptions {
            hash_algorithm: self.algorithm.clone(),
            ignore_paths: (!self.ignore_paths.is_empty()).then(|| self.ignore_paths.clone()),
            platforms: (!self.platforms.is_empty()).then(|| self.platforms.clone()),
            debug: self.debug.then_some(true),
            enable_react_imports_patcher: self.no_react_imports_patcher.then_some(false),
            concurrency: self.jobs,
            extra_sources: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_unset_flags_leave_options_open() {
        let raw = FingerprintArgs::default().to_raw_options();
        assert_eq!(raw, RawOptions::default());
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::parse_from([
            "native-fingerprint",
            "hash",
            "app",
            "--platform",
            "ios",
            "--ignore",
            "ios/Generated/**/*",
            "--no-react-imports-patcher",
            "-j",
            "2",
        ]);
        let Commands::Hash { root, options } = cli.command else {
            panic!("expected the hash command");
        };
        assert_eq!(root, PathBuf::from("app"));

        let raw = options.to_raw_options();
        assert_eq!(raw.platforms, Some(vec!["ios".to_string()]));
        assert_eq!(raw.ignore_paths, Some(vec!["ios/Generated/**/*".to_string()]));
        assert_eq!(raw.enable_react_imports_patcher, Some(false));
        assert_eq!(raw.concurrency, Some(2));
        assert_eq!(raw.debug, None);
    }
}
