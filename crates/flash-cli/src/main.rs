//! Flash CLI - k-anonymity filter for relational datasets.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{EnvFilter, prelude::*};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Anonymize(args) => commands::anonymize::run(args, cli.verbose),

        Commands::Hierarchy {
            file,
            attribute,
            config,
            hierarchy_dir,
            relation,
            json,
        } => commands::hierarchy::run(
            file,
            attribute,
            config,
            hierarchy_dir,
            relation,
            json,
            cli.verbose,
        ),

        Commands::Inspect {
            file,
            quasi_identifiers,
            sensitive,
            json,
        } => commands::inspect::run(file, quasi_identifiers, sensitive, json, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "flash=debug" } else { "flash=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
