//! sg CLI - SQL grammar documentation generator.
//!
//! Provides commands for:
//! - `bnf`: Extract per-statement BNF fragments from a yacc grammar
//! - `svg`: Render extracted fragments into railroad diagrams

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BnfArgs, GlobalArgs, SvgArgs};
use output::Output;

/// sg - SQL grammar to BNF fragments and railroad diagrams.
#[derive(Parser, Debug)]
#[command(name = "sg", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract BNF fragments into a directory.
    Bnf(BnfArgs),
    /// Render BNF fragments into HTML-embedded SVG diagrams.
    Svg(SvgArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new(cli.global.quiet);

    // RUST_LOG wins; otherwise --quiet / --verbose pick the level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.global.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Bnf(args) => args.execute(&cli.global),
        Commands::Svg(args) => args.execute(&cli.global),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
