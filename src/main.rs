use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

fn run(cli: &Cli) -> Result<()> {
    if !cli.infile.is_file() {
        bail!("input file not found: {}", cli.infile.display());
    }

    let config = cli.config();
    let artifacts = dot_fsm::compile_file(&cli.infile, &config)
        .with_context(|| format!("failed to compile {}", cli.infile.display()))?;
    let written = dot_fsm::write_output(&cli.outdir, &artifacts, &config)
        .with_context(|| format!("failed to write output to {}", cli.outdir.display()))?;

    tracing::info!(
        files = written.len(),
        outdir = %cli.outdir.display(),
        "generation complete"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
