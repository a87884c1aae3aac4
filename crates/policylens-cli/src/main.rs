//! PolicyLens CLI - policy question answering with trust scoring.

use anyhow::Context;
use clap::Parser;
use policylens_cli::commands;
use policylens_cli::config::load_config;
use policylens_cli::{Cli, Command, Formatter, Overrides};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = cli.format.map(Into::into).unwrap_or_default();
    let formatter = Formatter::new(format, !cli.no_color);

    if let Err(e) = run(cli, &formatter).await {
        eprintln!("{}", formatter.error(&format!("{:#}", e)));
        std::process::exit(1);
    }
}

/// Logs go to stderr so JSON on stdout stays parseable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, formatter: &Formatter) -> anyhow::Result<()> {
    let overrides = Overrides::from_cli(&cli);
    let config_path = cli.config;

    match cli.command {
        Command::Ask(args) => {
            let mut config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
            overrides
                .with_scheme(args.scheme.map(Into::into))
                .apply(&mut config)?;
            commands::execute_ask(args, config, formatter).await?;
        }
        Command::Assess(args) => {
            let mut config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
            overrides
                .with_scheme(args.scheme.map(Into::into))
                .apply(&mut config)?;
            commands::execute_assess(args, config, formatter).await?;
        }
        Command::Config(args) => {
            commands::execute_config(args, config_path.as_deref(), &overrides, formatter).await?;
        }
    }

    Ok(())
}
