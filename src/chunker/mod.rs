use std::ops::Range;
use std::sync::Arc;

use crate::config::{ChunkingConfig, TokenizerKind};
use crate::Result;

pub mod tokenizer;

pub use tokenizer::{HfTokenizer, WhitespaceTokenizer};

/// A token located in the source text by byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Byte offset where the token starts
    pub start: usize,

    /// Byte offset one past the end of the token
    pub end: usize,

    /// How much this token counts against the chunk budget
    pub weight: usize,
}

impl Token {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            weight: 1,
        }
    }

    pub fn weighted(start: usize, end: usize, weight: usize) -> Self {
        Self { start, end, weight }
    }
}

/// Trait for splitting text into tokens
pub trait Tokenizer: Send + Sync {
    /// Tokenize text, returning tokens in source order
    fn tokenize(&self, text: &str) -> Result<Vec<Token>>;

    /// Name used in logs
    fn name(&self) -> &str;

    /// Total token weight of the text
    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(self.tokenize(text)?.iter().map(|t| t.weight).sum())
    }
}

/// A contiguous, token-bounded span of source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the chunk sequence
    pub index: usize,

    /// Chunk text, trimmed of surrounding whitespace
    pub text: String,

    /// Token weight of the chunk
    pub token_count: usize,
}

/// Greedy token-accumulating chunker.
///
/// Tokens are appended to the current chunk until the next one would push its weight
/// past `max_tokens`; the chunk is then closed and the next starts with that token.
/// Chunks partition the source text, so joining them with whitespace gives back the
/// original words. A token heavier than `max_tokens` still gets a chunk of its own, as
/// does a character whose bytes are spread over more tokens than the bound allows.
#[derive(Clone)]
pub struct TranscriptChunker {
    tokenizer: Arc<dyn Tokenizer>,
    max_tokens: usize,
}

impl TranscriptChunker {
    /// Default maximum number of tokens per chunk
    pub const DEFAULT_MAX_TOKENS: usize = 375;

    pub fn new(tokenizer: Arc<dyn Tokenizer>, max_tokens: usize) -> Self {
        Self {
            tokenizer,
            max_tokens,
        }
    }

    /// Same tokenizer, different bound
    pub fn with_max_tokens(&self, max_tokens: usize) -> Self {
        Self {
            tokenizer: Arc::clone(&self.tokenizer),
            max_tokens,
        }
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// Count tokens with the chunker's own tokenizer
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        self.tokenizer.count_tokens(text)
    }

    /// Split text into ordered chunks
    pub fn chunk(&self, text: &str) -> Result<Vec<Chunk>> {
        let tokens = self.tokenizer.tokenize(text)?;
        let mut chunks = Vec::new();

        let mut span_start = 0usize;
        let mut first = 0usize;
        let mut weight = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            if i > first && weight + token.weight > self.max_tokens {
                let boundary = char_boundary_at_or_before(text, token.start).max(span_start);

                // Byte tokens of one character stay together
                if boundary > span_start {
                    push_chunk(&mut chunks, text, span_start..boundary, &tokens[first..i]);
                    span_start = boundary;
                    first += tokens[first..i]
                        .iter()
                        .take_while(|t| t.end <= boundary)
                        .count();
                    weight = tokens[first..i].iter().map(|t| t.weight).sum();
                }
            }

            weight += token.weight;
        }

        if first < tokens.len() {
            push_chunk(&mut chunks, text, span_start..text.len(), &tokens[first..]);
        }

        tracing::debug!(
            "Chunked {} tokens into {} chunks (max {} tokens, {} tokenizer)",
            tokens.len(),
            chunks.len(),
            self.max_tokens,
            self.tokenizer.name()
        );

        Ok(chunks)
    }
}

impl std::fmt::Debug for TranscriptChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptChunker")
            .field("tokenizer", &self.tokenizer.name())
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Push the trimmed span, weighing only the tokens that overlap what is kept
fn push_chunk(chunks: &mut Vec<Chunk>, text: &str, span: Range<usize>, tokens: &[Token]) {
    let raw = &text[span.clone()];
    let start = span.start + (raw.len() - raw.trim_start().len());
    let end = span.start + raw.trim_end().len();
    if start >= end {
        return;
    }

    let token_count: usize = tokens
        .iter()
        .filter(|t| t.start < end && t.end > start)
        .map(|t| t.weight)
        .sum();

    chunks.push(Chunk {
        index: chunks.len(),
        text: text[start..end].to_string(),
        token_count,
    });
}

fn char_boundary_at_or_before(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Build the tokenizer selected by the chunking configuration.
///
/// Loading the GPT-2 tokenizer may hit the network on first use, so call this from
/// a blocking context.
pub fn build_tokenizer(config: &ChunkingConfig) -> Result<Arc<dyn Tokenizer>> {
    if let Some(path) = &config.tokenizer_file {
        tracing::info!("Loading tokenizer from {}", path.display());
        return Ok(Arc::new(HfTokenizer::from_file(path)?));
    }

    match config.tokenizer {
        TokenizerKind::Gpt2 => {
            tracing::info!("Loading pretrained gpt2 tokenizer");
            Ok(Arc::new(HfTokenizer::from_pretrained("gpt2")?))
        }
        TokenizerKind::Whitespace => Ok(Arc::new(WhitespaceTokenizer)),
    }
}
