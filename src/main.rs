use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_condenser::chunker::{self, TranscriptChunker};
use transcript_condenser::cli::{self, Cli, Commands};
use transcript_condenser::config::{Config, Credentials, TokenizerKind};
use transcript_condenser::extractors::youtube::YoutubeTranscriptSource;
use transcript_condenser::generation::OpenAiClient;
use transcript_condenser::output;
use transcript_condenser::pipeline::{CondensePipeline, PipelineOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "transcript_condenser=debug"
    } else {
        "transcript_condenser=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load().await?;

    match cli.command {
        Commands::Summarize {
            url,
            chunk_size,
            batch,
            keys_file,
            output_dir,
            format,
            tokenizer,
            no_priming,
        } => {
            if let Some(size) = chunk_size {
                config.chunking.max_tokens = size;
            }
            if let Some(path) = keys_file {
                config.app.keys_file = path;
            }
            if let Some(dir) = output_dir {
                config.app.output_dir = Some(dir);
            }
            if let Some(format) = format {
                config.app.output_format = format;
            }
            if no_priming {
                config.pipeline.prime_phases = false;
            }
            override_tokenizer(&mut config, tokenizer);
            config.validate()?;

            summarize(config, url, batch, cli.quiet).await?;
        }
        Commands::Chunk {
            file,
            chunk_size,
            tokenizer,
        } => {
            if let Some(size) = chunk_size {
                config.chunking.max_tokens = size;
            }
            override_tokenizer(&mut config, tokenizer);
            config.validate()?;

            print_chunks(config, file).await?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
                println!("  Config File: {}", Config::config_path()?.display());
            } else {
                println!("Edit the config file to change settings:");
                println!("  {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn override_tokenizer(config: &mut Config, tokenizer: Option<TokenizerKind>) {
    if let Some(kind) = tokenizer {
        config.chunking.tokenizer = kind;
        config.chunking.tokenizer_file = None;
    }
}

async fn load_chunker(config: &Config) -> Result<TranscriptChunker> {
    let chunking = config.chunking.clone();
    let tokenizer = tokio::task::spawn_blocking(move || chunker::build_tokenizer(&chunking)).await??;
    Ok(TranscriptChunker::new(tokenizer, config.chunking.max_tokens))
}

async fn summarize(config: Config, url: Option<String>, batch: bool, quiet: bool) -> Result<()> {
    // Keys are checked before anything touches the network
    let credentials = Credentials::load(&config.app.keys_file)?;

    let url = match url {
        Some(url) => url,
        None => cli::prompt_for_url()?,
    };

    let chunker = load_chunker(&config).await?;
    let review = credentials.has_reviewer();
    let generator = OpenAiClient::new(&config.generation, credentials)?;
    tracing::info!("Using model {} at {}", generator.model(), config.generation.base_url);

    let pipeline = CondensePipeline::new(
        Arc::new(YoutubeTranscriptSource::new(config.pipeline.languages.clone())),
        Arc::new(generator),
        chunker,
        PipelineOptions {
            prime_phases: config.pipeline.prime_phases,
            review,
            show_progress: !quiet,
        },
    );

    let output_dir = match &config.app.output_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    let chunk_sizes = if batch {
        config.chunking.batch_sizes.clone()
    } else {
        vec![config.chunking.max_tokens]
    };

    let fetched = pipeline.fetch_transcript(&url).await?;

    for size in chunk_sizes {
        if batch {
            tracing::info!("Batch run with chunk size {}", size);
        }

        let result = pipeline.with_chunk_size(size).condense_entries(&fetched).await?;

        match output::write_output(&result, &output_dir, &config.app.output_format) {
            Ok(path) => {
                println!("Ding! Transcript is ready.");
                println!("Condensed transcript saved to: {}", path.display());
            }
            Err(e) => {
                tracing::warn!("Output for chunk size {} was not saved", size);
                eprintln!("An error occurred: {}", e);
            }
        }
    }

    Ok(())
}

async fn print_chunks(config: Config, file: PathBuf) -> Result<()> {
    let text = fs_err::read_to_string(&file)?;
    let chunker = load_chunker(&config).await?;
    let chunks = chunker.chunk(&text)?;

    println!(
        "{} chunks from {} tokens (max {} per chunk, {} tokenizer)",
        chunks.len(),
        chunker.count_tokens(&text)?,
        chunker.max_tokens(),
        chunker.tokenizer().name()
    );

    for chunk in &chunks {
        println!();
        println!("--- chunk {} ({} tokens) ---", chunk.index + 1, chunk.token_count);
        println!("{}", chunk.text);
    }

    Ok(())
}
