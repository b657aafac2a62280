pub mod diff;
pub mod fingerprint;
pub mod hash;
pub mod init;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::cli::FingerprintArgs;
use native_fingerprint::config::load_options;
use native_fingerprint::Options;

/// Resolve options for `root` from fingerprint.toml and the command line flags.
fn resolve_options(root: &Path, args: &FingerprintArgs) -> Result<Options> {
    if !root.is_dir() {
        anyhow::bail!("Project root is not a directory: {}", root.display());
    }
    let options = load_options(root, args.to_raw_options())
        .with_context(|| format!("Invalid fingerprint options for {}", root.display()))?;
    if let Ok(json) = serde_json::to_string(&options) {
        tracing::debug!("Options: {}", json);
    }
    Ok(options)
}

/// Run `op` behind a spinner on stderr, hidden when `quiet` is set.
fn with_spinner<T>(message: &str, quiet: bool, op: impl FnOnce() -> T) -> T {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = op();
    pb.finish_and_clear();
    result
}
