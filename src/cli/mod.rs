use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::TokenizerKind;

#[derive(Parser)]
#[command(
    name = "condenser",
    about = "Transcript Condenser - Turn YouTube transcripts into information-dense summaries",
    version,
    long_about = "Fetches the transcript of a YouTube video, splits it into token-bounded chunks and runs them through a text-generation API twice: once to reformat the raw captions into readable text, once to condense it into a dense summary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Condense the transcript of a YouTube video
    Summarize {
        /// Video URL (prompted for if not given)
        #[arg(value_name = "URL")]
        url: Option<String>,

        /// Maximum tokens per chunk (overrides config)
        #[arg(short = 's', long, value_name = "TOKENS")]
        chunk_size: Option<usize>,

        /// Run once per configured batch chunk size, writing one file each
        #[arg(long, conflicts_with = "chunk_size")]
        batch: bool,

        /// key=value file with the API keys
        #[arg(short, long, value_name = "FILE", env = "CONDENSER_KEYS_FILE")]
        keys_file: Option<PathBuf>,

        /// Directory to write the output file to
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Tokenizer used for chunking
        #[arg(long, value_enum)]
        tokenizer: Option<TokenizerKind>,

        /// Skip the instruction-only request sent before each phase
        #[arg(long)]
        no_priming: bool,
    },

    /// Print the chunks a local text file would be split into
    Chunk {
        /// Text file to chunk
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Maximum tokens per chunk (overrides config)
        #[arg(short = 's', long, value_name = "TOKENS")]
        chunk_size: Option<usize>,

        /// Tokenizer used for chunking
        #[arg(long, value_enum)]
        tokenizer: Option<TokenizerKind>,
    },

    /// Show or locate the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Plain condensed text
    Text,
    /// JSON with run metadata and both phase outputs
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Ask for the video URL on the terminal
pub fn prompt_for_url() -> std::io::Result<String> {
    let term = console::Term::stdout();
    term.write_str("Please paste URL of the video: ")?;
    let line = term.read_line()?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_summarize() {
        let cli = Cli::try_parse_from([
            "condenser",
            "summarize",
            "https://youtu.be/abcdefghijk",
            "--chunk-size",
            "300",
            "--format",
            "json",
            "--no-priming",
        ])
        .unwrap();

        match cli.command {
            Commands::Summarize {
                url,
                chunk_size,
                batch,
                format,
                no_priming,
                ..
            } => {
                assert_eq!(url.as_deref(), Some("https://youtu.be/abcdefghijk"));
                assert_eq!(chunk_size, Some(300));
                assert!(!batch);
                assert_eq!(format, Some(OutputFormat::Json));
                assert!(no_priming);
            }
            _ => panic!("expected summarize"),
        }
    }

    #[test]
    fn test_batch_conflicts_with_chunk_size() {
        let result = Cli::try_parse_from([
            "condenser",
            "summarize",
            "https://youtu.be/abcdefghijk",
            "--batch",
            "--chunk-size",
            "300",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_url_is_optional() {
        let cli = Cli::try_parse_from(["condenser", "-q", "summarize", "--batch"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Summarize { url: None, batch: true, .. }));
    }
}
