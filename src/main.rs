mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "native_fingerprint=debug"
    } else if cli.quiet {
        "native_fingerprint=error"
    } else {
        "native_fingerprint=info"
    };

    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Init { root, force } => commands::init::run(root, force),
        Commands::Fingerprint {
            root,
            output,
            options,
        } => commands::fingerprint::run(root, output, options, cli.quiet),
        Commands::Hash { root, options } => commands::hash::run(root, options, cli.quiet),
        Commands::Diff {
            fingerprint,
            root,
            json,
            options,
        } => commands::diff::run(fingerprint, root, json, options, cli.quiet),
    }
}
