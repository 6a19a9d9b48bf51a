mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{hexagonize, replay, resolution};
use tracing_subscriber::EnvFilter;

/// Log to stderr; stdout carries command output. `RUST_LOG` overrides `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hexmap={level},hexmap_cli={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Hexagonize(args) => hexagonize::run(&cli, args),
        Commands::Replay(args) => replay::run(&cli, args),
        Commands::Resolution(args) => resolution::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
