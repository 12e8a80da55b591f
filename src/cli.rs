use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use idscan_lib::models::{ProcessingStatus, RawDocument, RecordFilter};

#[derive(Parser)]
#[command(name = "idscan")]
#[command(version, about = "Extract driving license fields from scans and PDFs")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process files and print one outcome per file as JSON.
    ///
    /// Printed images are read with Tesseract, which needs a build with
    /// `--features ocr` and installed tessdata. Without it every printed
    /// image comes back FAILED. PDFs and handwritten images are unaffected.
    Process {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Content type for every file. Guessed from the extension when omitted.
        #[arg(long = "content-type")]
        content_type: Option<String>,
        /// Worker threads. Defaults to IDSCAN_BATCH_WORKERS or the CPU count.
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Process files into a record store and print the records matching the filters.
    Report {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        status: Option<ProcessingStatus>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "handwritten-only")]
        handwritten_only: bool,
    },
    /// Print the effective configuration. The API key is never shown.
    Config,
}

impl Command {
    pub fn report_filter(&self) -> RecordFilter {
        match self {
            Command::Report {
                state,
                status,
                name,
                handwritten_only,
                ..
            } => RecordFilter {
                state: state.clone(),
                status: *status,
                name_contains: name.clone(),
                handwritten_only: *handwritten_only,
                ..Default::default()
            },
            _ => RecordFilter::default(),
        }
    }
}

/// Content type for `path`: the explicit override, else a guess from the
/// extension. Unknown extensions give `None` so the pipeline rejects them.
pub fn content_type_for(path: &Path, explicit: Option<&str>) -> Option<String> {
    if let Some(ct) = explicit {
        return Some(ct.to_string());
    }
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

pub fn load_document(path: &Path, explicit: Option<&str>) -> std::io::Result<RawDocument> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let content_type = content_type_for(path, explicit);
    Ok(RawDocument::new(bytes, content_type.as_deref(), &filename))
}
