use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod store;

use error::{CliError, ErrorCode};

#[derive(Parser)]
#[command(name = "wellplate", version, about = "Lay out, finalize and export 96-well plates")]
struct Cli {
    /// Verbose logging and a printed plate map
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a plate from a session file and write layout.yaml (and the
    /// import template when the session names a batch number)
    Layout {
        #[arg(value_name = "SESSION")]
        session: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output: PathBuf,
    },
    /// Lay out a session, persist it as a batch and write its template
    Finalize {
        #[arg(value_name = "SESSION")]
        session: PathBuf,

        /// Batch store directory
        #[arg(long, value_name = "DIR")]
        store: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output: PathBuf,
    },
    /// Write the import template for a persisted batch record
    Export {
        #[arg(value_name = "BATCH_JSON")]
        batch: PathBuf,

        /// Operator named in the template header
        #[arg(long)]
        operator: String,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output: PathBuf,
    },
    /// List electrophoresis batches available as rerun sources
    Sources {
        /// Batch store directory
        #[arg(long, value_name = "DIR")]
        store: PathBuf,
    },
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Layout { session, output } => commands::run_layout(&session, &output, cli.debug),
        Command::Finalize {
            session,
            store,
            output,
        } => commands::run_finalize(&session, &store, &output, cli.debug).await,
        Command::Export {
            batch,
            operator,
            output,
        } => commands::run_export(&batch, &operator, &output),
        Command::Sources { store } => commands::run_sources(&store).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(ErrorCode::Usage as u8)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}
