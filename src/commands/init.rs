use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;

use native_fingerprint::config::CONFIG_FILE_NAME;
use native_fingerprint::RawOptions;

pub fn run(root: PathBuf, force: bool) -> Result<()> {
    if !root.is_dir() {
        anyhow::bail!("Project root is not a directory: {}", root.display());
    }

    let config_path = root.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        println!(
            "{} Configuration file already exists: {}",
            style("!").yellow().bold(),
            config_path.display()
        );
        println!("  Use {} to overwrite.", style("--force").cyan());
        return Ok(());
    }

    let content = RawOptions::default_toml();

    std::fs::write(&config_path, &content)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    println!(
        "{} Created configuration file: {}",
        style("✓").green().bold(),
        style(config_path.display()).cyan()
    );

    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} to configure ignored paths and platforms",
        style(CONFIG_FILE_NAME).cyan()
    );
    println!(
        "  2. Run {} to store a fingerprint",
        style("native-fingerprint fingerprint -o fingerprint.json").cyan()
    );
    println!(
        "  3. Run {} to see what changed since",
        style("native-fingerprint diff fingerprint.json").cyan()
    );

    Ok(())
}
