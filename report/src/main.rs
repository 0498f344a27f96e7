use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use common::{
    context::Context,
    entities::{file::UploadTarget, report::ReportKind},
    error,
};
use report::handlers::report::{export, show, upload};

#[derive(Parser, Debug)]
#[command(name = "report-console", version, about = "Upload spreadsheets and browse derived reports")]
struct Cli {
    #[arg(long, global = true, help = "Backend base URL, overrides API_BASE")]
    api_base: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload spreadsheets to an ingestion endpoint
    Upload {
        target: UploadTarget,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print a report as a table
    Show {
        kind: ReportKind,
        #[arg(long)]
        filter: Option<String>,
    },
    /// Save a report as report_<kind>.xlsx
    Export {
        kind: ReportKind,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

async fn run(cli: Cli) -> error::Result<()> {
    let context = match cli.api_base.filter(|base| !base.trim().is_empty()) {
        Some(base_url) => Context::with_base_url(base_url)?,
        None => Context::from_env()?,
    };
    log::debug!("Using backend at {}", context.base_url());

    match cli.command {
        Commands::Upload { target, paths } => upload(&context, target, paths).await,
        Commands::Show { kind, filter } => show(&context, kind, filter).await,
        Commands::Export { kind, out_dir } => export(&context, kind, out_dir).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    env_logger::init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}
