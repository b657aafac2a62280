use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;

use super::{resolve_options, with_spinner};
use crate::cli::FingerprintArgs;
use native_fingerprint::create_fingerprint;

pub fn run(
    root: PathBuf,
    output: Option<PathBuf>,
    args: FingerprintArgs,
    quiet: bool,
) -> Result<()> {
    let options = resolve_options(&root, &args)?;

    let fingerprint = with_spinner("Hashing native sources", quiet, || {
        create_fingerprint(&root, &options)
    })
    .with_context(|| format!("Failed to fingerprint {}", root.display()))?;

    let json = fingerprint
        .to_json_pretty()
        .context("Failed to serialize fingerprint")?;

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{json}\n"))
                .with_context(|| format!("Failed to write fingerprint: {}", path.display()))?;
            if !quiet {
                println!(
                    "{} Fingerprint {} ({} sources)",
                    style("✓").green().bold(),
                    style(&fingerprint.hash).cyan(),
                    fingerprint.sources.len()
                );
                println!("  Written to: {}", style(path.display()).cyan());
            }
        }
        None => println!("{json}"),
    }

    Ok(())
}
