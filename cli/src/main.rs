//! CLI entry point for groupfold.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use groupfold_cli::commands::{self, DowncastOptions, SplitOptions};
use groupfold_cli::config::{Config, OutputFormat};
use groupfold_cli::error::{Error, Result};

#[derive(Parser)]
#[command(name = "groupfold")]
#[command(about = "Group-aware time series cross-validation splits")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the train/test indices of every split
    Split(SplitArgs),

    /// Print fold geometry (groups, window, thresholds) without indices
    Plan(SplitArgs),

    /// Show how a downcast would retype each column
    Downcast {
        /// Path to a headed CSV file
        input: PathBuf,

        /// Width of the columns to rewrite
        #[arg(long, default_value_t = 64)]
        from_bits: u32,

        /// Target width
        #[arg(long, default_value_t = 32)]
        to_bits: u32,

        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Args)]
struct SplitArgs {
    /// Path to a headed CSV file
    input: PathBuf,

    /// Number of splits (overrides the config)
    #[arg(long)]
    n_splits: Option<String>,

    /// Column holding the group labels (default: first column)
    #[arg(long)]
    group_column: Option<String>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

impl From<SplitArgs> for SplitOptions {
    fn from(args: SplitArgs) -> Self {
        SplitOptions {
            input: args.input,
            n_splits: args.n_splits,
            group_column: args.group_column,
            format: args.format,
        }
    }
}

fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Split(args) => commands::run_split(&config, &args.into(), out)?,
        Command::Plan(args) => commands::run_plan(&config, &args.into(), out)?,
        Command::Downcast {
            input,
            from_bits,
            to_bits,
            format,
        } => {
            let opts = DowncastOptions {
                input,
                from_bits,
                to_bits,
                format,
            };
            commands::run_downcast(&config, &opts, out)?
        }
    }
    out.flush()?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Err(e) = run(cli, &mut out) {
        match &e {
            Error::Configuration(err) => {
                eprintln!("Invalid configuration: {err}");
                process::exit(2);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
