use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use callslice::cli::Cli;
use callslice::error::SlicerError;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging; stdout carries the document
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting callslice v{}", env!("CARGO_PKG_VERSION"));

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let slicer = err.chain().find_map(|cause| cause.downcast_ref::<SlicerError>());
            match slicer {
                Some(SlicerError::Usage(usage)) => eprintln!("{}", usage),
                _ => eprintln!("Error: {:#}", err),
            }
            ExitCode::from(slicer.map_or(1, SlicerError::exit_code))
        }
    }
}
