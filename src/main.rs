mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use cli::{load_document, Cli, Command};
use idscan_lib::config::{self, PipelineConfig};
use idscan_lib::models::RawDocument;
use idscan_lib::pipeline::processor::build_pipeline;
use idscan_lib::store::InMemoryRecordStore;

fn main() -> ExitCode {
    idscan_lib::init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = PipelineConfig::from_env()?;
    let filter = cli.cmd.report_filter();

    match cli.cmd {
        Command::Process {
            files,
            content_type,
            workers,
        } => {
            let documents = load_all(&files, content_type.as_deref())?;
            let pipeline = build_pipeline(&config)?;
            let outcomes =
                pipeline.process_batch(&documents, workers.unwrap_or(config.batch_workers));
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        }
        Command::Report { files, .. } => {
            let documents = load_all(&files, None)?;
            let store = Arc::new(InMemoryRecordStore::new());
            let pipeline = build_pipeline(&config)?.with_sink(store.clone());
            pipeline.process_batch(&documents, config.batch_workers);
            println!("{}", serde_json::to_string_pretty(&store.query(&filter)?)?);
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn load_all(
    files: &[std::path::PathBuf],
    content_type: Option<&str>,
) -> std::io::Result<Vec<RawDocument>> {
    files
        .iter()
        .map(|path| {
            load_document(path, content_type).map_err(|e| {
                std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))
            })
        })
        .collect()
}
