mod cli;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

use cli::PanelArgs;
use rcasef::SefConfig;

#[derive(Parser)]
#[command(name = "rcasef", about = "RCA MK II Sound Effects Filter: WDF high-pass/low-pass model")]
struct Cli {
    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Filter a WAV file.
    Process {
        /// Input WAV file.
        input: PathBuf,
        /// Output WAV file (32-bit float).
        output: PathBuf,
        #[command(flatten)]
        panel: PanelArgs,
    },
    /// Write the magnitude response for a setting as one CSV line.
    Response {
        /// Output CSV file.
        output: PathBuf,
        /// Sample rate to analyse at (defaults to the preset's).
        #[arg(long)]
        sample_rate: Option<u32>,
        #[command(flatten)]
        panel: PanelArgs,
    },
    /// Print the hardware switch tables.
    Table,
    /// Write a default preset.
    Init {
        #[arg(default_value = "rcasef.yaml")]
        path: PathBuf,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn init(path: &Path, force: bool) -> rcasef::Result<()> {
    if path.exists() && !force {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} exists (use --force to overwrite)", path.display()),
        )
        .into());
    }
    SefConfig::default().save(path)?;
    tracing::info!(path = %path.display(), "wrote default preset");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let result = match &cli.command {
        Command::Process {
            input,
            output,
            panel,
        } => cli::process::run(input, output, panel),
        Command::Response {
            output,
            sample_rate,
            panel,
        } => cli::response::run(output, *sample_rate, panel),
        Command::Table => {
            cli::table::run();
            Ok(())
        }
        Command::Init { path, force } => init(path, *force),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
