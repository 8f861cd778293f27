use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod youtube;

use crate::Result;

/// A timestamped fragment of spoken text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Spoken text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptEntry {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Trait for fetching the transcript of a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the ordered transcript entries for a video id
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptEntry>>;

    /// Get the name of this source
    fn source_name(&self) -> &'static str;
}

/// Concatenate entry texts in order, separated by single spaces
pub fn join_entries(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Total spoken duration covered by the entries, in seconds
pub fn total_duration(entries: &[TranscriptEntry]) -> f64 {
    entries
        .last()
        .map(|entry| entry.start + entry.duration)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_entries() {
        let entries = vec![
            TranscriptEntry::new("hello there", 0.0, 1.5),
            TranscriptEntry::new("general", 1.5, 0.8),
            TranscriptEntry::new("kenobi", 2.3, 1.0),
        ];

        assert_eq!(join_entries(&entries), "hello there general kenobi");
        assert!((total_duration(&entries) - 3.3).abs() < 1e-9);
    }

    #[test]
    fn test_join_empty() {
        assert_eq!(join_entries(&[]), "");
        assert_eq!(total_duration(&[]), 0.0);
    }
}
