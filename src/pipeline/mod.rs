use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::chunker::{Chunk, TranscriptChunker};
use crate::extractors::{self, youtube, TranscriptEntry, TranscriptSource};
use crate::generation::{GenerationRequest, TextGenerator};
use crate::utils;
use crate::Result;

pub mod phase;

pub use phase::{Phase, PhaseLog};

/// Condensed transcript with run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondensedTranscript {
    /// Video id the transcript came from
    pub video_id: String,

    /// Token bound used for both chunking passes
    pub chunk_size: usize,

    /// Number of chunks in the raw transcript
    pub raw_chunks: usize,

    /// Number of chunks in the reformatted transcript
    pub formatted_chunks: usize,

    /// Whether condensed chunks went through the reviewer
    pub reviewed: bool,

    /// Spoken duration of the source transcript in seconds
    pub transcript_duration: f64,

    /// Output of the reformat phase
    pub formatted: String,

    /// Output of the condense phase
    pub condensed: String,

    /// Timestamp when the run completed
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Transcript fetched for a video, reusable across chunk sizes
#[derive(Debug, Clone)]
pub struct FetchedTranscript {
    pub video_id: String,
    pub entries: Vec<TranscriptEntry>,
}

/// Pipeline behaviour switches
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Send each phase's instructions once before its chunks
    pub prime_phases: bool,

    /// Re-run condense prompts under the reviewer credential
    pub review: bool,

    /// Show a progress bar per phase
    pub show_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            prime_phases: true,
            review: false,
            show_progress: true,
        }
    }
}

/// Two-phase reformat/condense pipeline
pub struct CondensePipeline {
    source: Arc<dyn TranscriptSource>,
    generator: Arc<dyn TextGenerator>,
    chunker: TranscriptChunker,
    options: PipelineOptions,
}

impl CondensePipeline {
    /// Create a new pipeline
    pub fn new(
        source: Arc<dyn TranscriptSource>,
        generator: Arc<dyn TextGenerator>,
        chunker: TranscriptChunker,
        options: PipelineOptions,
    ) -> Self {
        Self {
            source,
            generator,
            chunker,
            options,
        }
    }

    /// Same collaborators, different chunk size
    pub fn with_chunk_size(&self, max_tokens: usize) -> Self {
        Self {
            source: Arc::clone(&self.source),
            generator: Arc::clone(&self.generator),
            chunker: self.chunker.with_max_tokens(max_tokens),
            options: self.options,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunker.max_tokens()
    }

    /// Fetch, reformat and condense the transcript of the video at `url`
    pub async fn condense_url(&self, url: &str) -> Result<CondensedTranscript> {
        let fetched = self.fetch_transcript(url).await?;
        self.condense_entries(&fetched).await
    }

    /// Resolve the video id and fetch its transcript
    pub async fn fetch_transcript(&self, url: &str) -> Result<FetchedTranscript> {
        let video_id = youtube::require_video_id(url)?;

        tracing::info!(
            "Fetching transcript for video {} from {}",
            video_id,
            self.source.source_name()
        );
        let entries = self.source.fetch(&video_id).await?;
        tracing::info!("Fetched {} transcript entries", entries.len());

        Ok(FetchedTranscript { video_id, entries })
    }

    /// Run both phases over an already fetched transcript
    pub async fn condense_entries(&self, fetched: &FetchedTranscript) -> Result<CondensedTranscript> {
        let started = Instant::now();
        let raw = extractors::join_entries(&fetched.entries);

        let raw_chunks = self.chunker.chunk(&raw)?;
        tracing::info!(
            "Split raw transcript into {} chunks of at most {} tokens",
            raw_chunks.len(),
            self.chunk_size()
        );
        let formatted = self.run_phase(Phase::Reformat, &raw_chunks).await?;

        // Condense works on the joined reformat output, not on its per-chunk outputs
        let formatted_chunks = self.chunker.chunk(&formatted)?;
        tracing::info!(
            "Split formatted transcript into {} chunks",
            formatted_chunks.len()
        );
        let condensed = self.run_phase(Phase::Condense, &formatted_chunks).await?;

        tracing::info!(
            "Condensed {} chars to {} chars in {}",
            raw.len(),
            condensed.len(),
            utils::format_duration(started.elapsed().as_secs_f64())
        );

        Ok(CondensedTranscript {
            video_id: fetched.video_id.clone(),
            chunk_size: self.chunk_size(),
            raw_chunks: raw_chunks.len(),
            formatted_chunks: formatted_chunks.len(),
            reviewed: self.options.review,
            transcript_duration: extractors::total_duration(&fetched.entries),
            formatted,
            condensed,
            generated_at: chrono::Utc::now(),
        })
    }

    /// Feed every chunk through the generator, carrying prior outputs as context
    async fn run_phase(&self, phase: Phase, chunks: &[Chunk]) -> Result<String> {
        tracing::info!("{} phase: {} chunks", phase, chunks.len());

        if self.options.prime_phases && !chunks.is_empty() {
            let primer = self
                .generator
                .generate(&GenerationRequest::writer(phase.instructions()))
                .await?;
            tracing::debug!(
                "{} priming response discarded: {}",
                phase,
                utils::preview(&primer, 80)
            );
        }

        let review = phase.is_reviewed() && self.options.review;
        let progress = self.progress_bar(phase, chunks.len());
        let mut log = PhaseLog::new();

        for chunk in chunks {
            let prompt = log.prompt_for(phase, &chunk.text);
            tracing::debug!(
                "{} chunk {}/{} ({} tokens, prompt {} chars)",
                phase,
                chunk.index + 1,
                chunks.len(),
                chunk.token_count,
                prompt.len()
            );

            let mut output = self
                .generator
                .generate(&GenerationRequest::writer(prompt.as_str()))
                .await?;

            if review {
                output = self
                    .generator
                    .generate(&GenerationRequest::reviewer(prompt))
                    .await?;
            }

            log.push(output);
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(log.into_joined())
    }

    fn progress_bar(&self, phase: Phase, len: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            progress.set_style(style.progress_chars("#>-"));
        }
        progress.set_message(format!("{} phase", phase));
        progress
    }
}
