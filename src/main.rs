use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use vetcardio_report::{ReportConfig, write_report};

/// Compose a veterinary echocardiography report PDF from an exam record.
#[derive(Parser, Debug)]
#[command(name = "vetcardio-report", version, about)]
struct Args {
    /// Exam record JSON
    exam: PathBuf,

    /// Clinic and practitioner branding JSON
    #[arg(long)]
    branding: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Layout configuration JSON (defaults plus VETCARDIO_* overrides otherwise)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hide reference range and classification columns
    #[arg(long)]
    no_references: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match std::fs::read_to_string(path)
            .map_err(vetcardio_report::Error::from)
            .and_then(|json| ReportConfig::from_json(&json))
        {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error reading config {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => ReportConfig::from_env(),
    };
    if args.no_references {
        config.show_references = false;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(write_report(
        &args.exam,
        args.branding.as_deref(),
        &args.out,
        &config,
    ));
    match result {
        Ok(path) => {
            println!("Wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Could not generate report: {e}");
            ExitCode::FAILURE
        }
    }
}
