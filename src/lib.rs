//! Transcript Condenser - A Rust CLI tool for condensing video transcripts
//!
//! This library fetches the spoken-content transcript of a YouTube video, splits it into
//! token-bounded chunks, and runs those chunks through a text-generation API twice
//! (reformat, then condense) to produce an information-dense summary.

pub mod chunker;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod generation;
pub mod output;
pub mod pipeline;
pub mod utils;

pub use chunker::{Chunk, Tokenizer, TranscriptChunker};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{Config, Credentials};
pub use extractors::{TranscriptEntry, TranscriptSource};
pub use generation::{Credential, GenerationRequest, TextGenerator};
pub use pipeline::{CondensePipeline, CondensedTranscript};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the condenser
#[derive(thiserror::Error, Debug)]
pub enum CondenserError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid video URL: {0}")]
    InvalidVideoUrl(String),

    #[error("Transcript fetch failed: {0}")]
    TranscriptFetch(String),

    #[error("Generation request failed: {0}")]
    Generation(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Failed to write {path}: {message}")]
    FileWrite {
        path: std::path::PathBuf,
        message: String,
    },
}
