use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::CondenserError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Text-generation service settings
    pub generation: GenerationConfig,

    /// Chunking settings
    pub chunking: ChunkingConfig,

    /// Pipeline behaviour
    pub pipeline: PipelineConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,

    /// Completion model name
    pub model: String,

    /// Maximum tokens generated per request
    pub max_output_tokens: Option<u32>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum tokens per chunk
    pub max_tokens: usize,

    /// Tokenizer used for chunking and counting
    pub tokenizer: TokenizerKind,

    /// Serialized tokenizer.json to use instead of `tokenizer`
    pub tokenizer_file: Option<PathBuf>,

    /// Chunk sizes tried in batch mode
    pub batch_sizes: Vec<usize>,
}

/// Tokenization scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    /// GPT-2 byte-level BPE
    Gpt2,
    /// Whitespace-separated words
    Whitespace,
}

impl std::fmt::Display for TokenizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenizerKind::Gpt2 => write!(f, "gpt2"),
            TokenizerKind::Whitespace => write!(f, "whitespace"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Send an instruction-only request before each phase
    pub prime_phases: bool,

    /// Preferred transcript languages, in order
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// key=value file holding the API keys
    pub keys_file: PathBuf,

    /// Directory for output files (current directory if unset)
    pub output_dir: Option<PathBuf>,

    /// Default output format
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation: GenerationConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-3.5-turbo-instruct".to_string(),
                max_output_tokens: Some(512),
                temperature: None,
                timeout_secs: 120,
            },
            chunking: ChunkingConfig {
                max_tokens: 375,
                tokenizer: TokenizerKind::Gpt2,
                tokenizer_file: None,
                batch_sizes: vec![200, 300, 400, 500],
            },
            pipeline: PipelineConfig {
                prime_phases: true,
                languages: vec!["en".to_string()],
            },
            app: AppConfig {
                keys_file: PathBuf::from("keys.txt"),
                output_dir: None,
                output_format: OutputFormat::Text,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Load and validate a specific configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // A config.yaml in the working directory wins
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("transcript-condenser").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_tokens == 0 {
            return Err(CondenserError::Config("chunking.max_tokens must be greater than 0".into()).into());
        }

        if self.chunking.batch_sizes.iter().any(|&size| size == 0) {
            return Err(CondenserError::Config("chunking.batch_sizes must all be greater than 0".into()).into());
        }

        if self.generation.model.trim().is_empty() {
            return Err(CondenserError::Config("generation.model must be set".into()).into());
        }

        if self.generation.timeout_secs == 0 {
            return Err(CondenserError::Config("generation.timeout_secs must be greater than 0".into()).into());
        }

        url::Url::parse(&self.generation.base_url).map_err(|e| {
            CondenserError::Config(format!(
                "generation.base_url '{}' is not a valid URL: {}",
                self.generation.base_url, e
            ))
        })?;

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Model: {}", self.generation.model);
        println!("  API Base URL: {}", self.generation.base_url);
        println!("  Request Timeout: {}s", self.generation.timeout_secs);
        println!("  Chunk Size: {} tokens", self.chunking.max_tokens);
        match &self.chunking.tokenizer_file {
            Some(path) => println!("  Tokenizer: {}", path.display()),
            None => println!("  Tokenizer: {}", self.chunking.tokenizer),
        }
        println!("  Batch Sizes: {:?}", self.chunking.batch_sizes);
        println!("  Priming Requests: {}", self.pipeline.prime_phases);
        println!("  Languages: {}", self.pipeline.languages.join(", "));
        println!("  Keys File: {}", self.app.keys_file.display());
        if let Some(dir) = &self.app.output_dir {
            println!("  Output Directory: {}", dir.display());
        }
        println!("  Default Format: {}", self.app.output_format);
    }
}

/// API credentials loaded from the key file
#[derive(Clone)]
pub struct Credentials {
    /// Primary key, used for every request
    pub writer: String,

    /// Optional key for the review pass
    pub reviewer: Option<String>,
}

impl Credentials {
    pub const WRITER_KEY: &'static str = "openai_API_key_1";
    pub const REVIEWER_KEY: &'static str = "openai_API_key_2";

    /// Read credentials from a key=value file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).map_err(|e| {
            CondenserError::Config(format!("Could not read key file: {}", e))
        })?;

        Self::parse(&content)
    }

    /// Parse key=value lines. Blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Result<Self> {
        let mut writer = None;
        let mut reviewer = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.trim() {
                Self::WRITER_KEY => writer = Some(value.to_string()),
                Self::REVIEWER_KEY => reviewer = Some(value.to_string()),
                _ => {}
            }
        }

        let writer = writer.ok_or_else(|| {
            CondenserError::Config(format!(
                "Writer API key not found ({} is required)",
                Self::WRITER_KEY
            ))
        })?;

        tracing::info!("Writer key: {}", crate::utils::mask_key(&writer));
        match &reviewer {
            Some(key) => tracing::info!("Reviewer key: {}", crate::utils::mask_key(key)),
            None => tracing::info!("Reviewer key not found, review pass disabled"),
        }

        Ok(Self { writer, reviewer })
    }

    pub fn has_reviewer(&self) -> bool {
        self.reviewer.is_some()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("writer", &crate::utils::mask_key(&self.writer))
            .field(
                "reviewer",
                &self.reviewer.as_deref().map(crate::utils::mask_key),
            )
            .finish()
    }
}
