pub mod types;
pub mod prompt;
pub mod parser;
pub mod fallback;
pub mod confidence;
pub mod ollama;
pub mod openai;
pub mod provider;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use fallback::*;
pub use confidence::*;
pub use ollama::*;
pub use openai::*;
pub use provider::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Model backend is not reachable at {0}")]
    Connection(String),

    #[error("Model backend returned error (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("No API key configured for the hosted model")]
    MissingApiKey,
}
