const REFORMAT_INSTRUCTIONS: &str = "You will be given a raw transcript of the spoken content of a video. \
The transcript has no formatting. Add punctuation and capitalization, turn the raw text into complete \
sentences and insert paragraph breaks where needed, so the result reads as properly formatted text.";

const CONDENSE_INSTRUCTIONS: &str = "The following transcript has poor information density: filler words, \
filler phrases and non-essential information. Condense and paraphrase it so that only the key elements of \
the content remain, keeping it as purely informational as possible. The goal is an information-dense \
summary that captures the essential ideas and actionable insights.";

/// One pass over a chunk sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Punctuate and paragraph the raw transcript
    Reformat,
    /// Strip filler and condense the formatted transcript
    Condense,
}

impl Phase {
    /// Instruction-only text sent as the phase's priming request
    pub fn instructions(&self) -> &'static str {
        match self {
            Phase::Reformat => REFORMAT_INSTRUCTIONS,
            Phase::Condense => CONDENSE_INSTRUCTIONS,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Phase::Reformat => "reformat",
            Phase::Condense => "condense",
        }
    }

    /// Whether outputs of this phase go through the reviewer when one is configured
    pub fn is_reviewed(&self) -> bool {
        matches!(self, Phase::Condense)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Reformat => write!(f, "Reformat"),
            Phase::Condense => write!(f, "Condense"),
        }
    }
}

/// Append-only outputs of the running phase, one per processed chunk.
///
/// The context string is rebuilt from the whole log for every chunk, which is
/// quadratic in transcript length.
#[derive(Debug, Default)]
pub struct PhaseLog {
    outputs: Vec<String>,
}

impl PhaseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, output: String) {
        self.outputs.push(output);
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Prompt for the next chunk, prefixed with everything generated so far
    pub fn prompt_for(&self, phase: Phase, chunk: &str) -> String {
        if self.outputs.is_empty() {
            format!("Chunk to {}: {}", phase.verb(), chunk)
        } else {
            format!(
                "Context so far: {}\nChunk to {}: {}",
                self.outputs.join(" "),
                phase.verb(),
                chunk
            )
        }
    }

    /// Space-joined phase output
    pub fn into_joined(self) -> String {
        self.outputs.join(" ")
    }
}
