mod error;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::render::{RenderOptions, run_render};

#[derive(Parser)]
#[command(name = "partgen", version, about = "Generate Fritzing parts from board definitions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a board definition into SVG views, a descriptor and a bundle
    Render(RenderArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Board definition (YAML)
    #[arg(value_name = "CONFIG")]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    output: PathBuf,

    /// Remove the output directory before writing
    #[arg(long)]
    clean: bool,

    /// Skip the zipped bundle
    #[arg(long)]
    no_bundle: bool,

    /// Verbose logging and a dump of the reconciled pins
    #[arg(short, long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let default = if debug { "partgen=debug" } else { "partgen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Ignored when a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Render(args) => {
            init_tracing(args.debug);
            run_render(RenderOptions {
                input: args.input,
                output: args.output,
                clean: args.clean,
                bundle: !args.no_bundle,
                debug: args.debug,
            })
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            if !err.use_stderr() {
                // --help and --version
                return ExitCode::SUCCESS;
            }
            return ExitCode::from(CliError::usage(err.to_string()).code as u8);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.code as u8)
        }
    }
}
