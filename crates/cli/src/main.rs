use adeptsearch_core::config;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Session;

#[derive(Parser, Debug)]
#[command(
    name = "adeptsearch",
    about = "Index .txt files and rank them with BM25",
    version,
    arg_required_else_help = true,
    after_help = "Examples:\n  adeptsearch --state idx.bin index ../sample_docs\n  adeptsearch --state idx.bin query \"machine learning\""
)]
struct Cli {
    /// Snapshot restored before the command (if present) and saved after `index` and `load`
    #[arg(long, global = true, env = config::STATE_ENV_VAR)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Index all .txt files under a directory, recursively
    Index {
        dir: PathBuf,

        /// Worker threads (defaults to available hardware parallelism)
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Run a query against the index
    Query {
        text: String,

        /// Number of results to return
        #[arg(short = 'k', long, default_value_t = config::DEFAULT_TOP_K)]
        top_k: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Dump the index to a binary file
    Dump { file: PathBuf },
    /// Replace the index with the contents of a binary file
    Load { file: PathBuf },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("adeptsearch=info,adeptsearch_core=info")
        }))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(cli.state)?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Index { dir, threads } => {
            let threads = threads.unwrap_or_else(|| {
                std::thread::available_parallelism().map_or(1, |n| n.get())
            });
            session.index(&dir, threads, &mut out)
        }
        Command::Query { text, top_k, json } => session.query(&text, top_k, json, &mut out),
        Command::Dump { file } => session.dump(&file, &mut out),
        Command::Load { file } => session.load(&file, &mut out),
    }
}
