use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{resolve_options, with_spinner};
use crate::cli::FingerprintArgs;
use native_fingerprint::create_project_hash;

pub fn run(root: PathBuf, args: FingerprintArgs, quiet: bool) -> Result<()> {
    let options = resolve_options(&root, &args)?;

    let hash = with_spinner("Hashing native sources", quiet, || {
        create_project_hash(&root, &options)
    })
    .with_context(|| format!("Failed to fingerprint {}", root.display()))?;

    println!("{hash}");
    Ok(())
}
