use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tdsreco_core::{Config, MatchPolicy};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Outcome;

/// Exit status when a run found nothing to write.
const EXIT_NO_DATA: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "tdsreco", version, about = "Form 26AS extraction, ledger summary and TDS reconciliation")]
struct Cli {
    /// TOML file with extraction, ledger and matching settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also print the resulting table to stdout as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// OCR a scanned Form 26AS PDF into a party/amount sheet
    Extract {
        /// Scanned statement PDF
        pdf: PathBuf,

        #[arg(short, long, default_value = "26AS_extracted.xlsx")]
        output: PathBuf,
    },

    /// Total a ledger export (xlsx, xls, ods or csv) by party
    Summarize {
        /// Ledger export; description, debit and credit in columns 3, 5 and 6
        ledger: PathBuf,

        #[arg(short, long, default_value = "party_summary.xlsx")]
        output: PathBuf,
    },

    /// Match a books summary against a statement extract
    Reconcile {
        /// Two-column party/amount sheet from the books
        #[arg(long)]
        books: PathBuf,

        /// Two-column party/amount sheet from Form 26AS
        #[arg(long)]
        statement: PathBuf,

        /// Minimum name similarity for a match (default 75)
        #[arg(long, value_parser = clap::value_parser!(u8).range(50..=100))]
        threshold: Option<u8>,

        /// greedy (default) or exclusive
        #[arg(long)]
        policy: Option<MatchPolicy>,

        #[arg(short, long, default_value = "reconciliation.xlsx")]
        output: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(Outcome::Written(path)) => {
            eprintln!("Wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Ok(Outcome::NoData(message)) => {
            eprintln!("{message}");
            ExitCode::from(EXIT_NO_DATA)
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let mut config = Config::load(cli.config.as_deref()).context("loading config")?;

    match cli.command {
        Command::Extract { pdf, output } => commands::extract(&config, &pdf, &output, cli.json).await,
        Command::Summarize { ledger, output } => commands::summarize(&config, &ledger, &output, cli.json),
        Command::Reconcile { books, statement, threshold, policy, output } => {
            if let Some(t) = threshold {
                config.reconcile.threshold = t;
            }
            if let Some(p) = policy {
                config.reconcile.policy = p;
            }
            commands::reconcile(&config, &books, &statement, &output, cli.json)
        }
    }
}
