use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;

use super::{resolve_options, with_spinner};
use crate::cli::FingerprintArgs;
use native_fingerprint::{diff_fingerprint_changes, Fingerprint, FingerprintDiffItem};

pub fn run(
    fingerprint_path: PathBuf,
    root: PathBuf,
    json: bool,
    args: FingerprintArgs,
    quiet: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(&fingerprint_path).with_context(|| {
        format!(
            "Failed to read fingerprint file: {}",
            fingerprint_path.display()
        )
    })?;
    let stored = Fingerprint::from_json(&content).with_context(|| {
        format!(
            "Failed to parse fingerprint file: {}",
            fingerprint_path.display()
        )
    })?;

    let options = resolve_options(&root, &args)?;
    let changes = with_spinner("Comparing with current project", quiet, || {
        diff_fingerprint_changes(&stored, &root, &options)
    })
    .with_context(|| format!("Failed to fingerprint {}", root.display()))?;

    if json {
        let output =
            serde_json::to_string_pretty(&changes).context("Failed to serialize changes")?;
        println!("{output}");
        return Ok(());
    }

    if changes.is_empty() {
        println!(
            "{} No changes since fingerprint {}",
            style("✓").green().bold(),
            style(&stored.hash).cyan()
        );
        return Ok(());
    }

    println!(
        "{} {} changed sources since fingerprint {}",
        style("!").yellow().bold(),
        changes.len(),
        style(&stored.hash).cyan()
    );
    for change in &changes {
        println!("  {}", describe(change));
    }

    Ok(())
}

fn describe(change: &FingerprintDiffItem) -> String {
    let (marker, source) = match change {
        FingerprintDiffItem::Added { source } => (style("+").green().bold(), source),
        FingerprintDiffItem::Removed { source } => (style("-").red().bold(), source),
        FingerprintDiffItem::Changed { after, .. } => (style("~").yellow().bold(), after),
    };

    let reasons = if source.reasons().is_empty() {
        String::new()
    } else {
        format!(" ({})", source.reasons().join(", "))
    };

    format!(
        "{} {} {}{}",
        marker,
        style(source.source.kind()).dim(),
        source.id(),
        style(reasons).dim()
    )
}
