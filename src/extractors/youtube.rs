use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use yt_transcript_rs::api::YouTubeTranscriptApi;

use super::{TranscriptEntry, TranscriptSource};
use crate::{CondenserError, Result};

/// Video id patterns, in priority order
static VIDEO_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[?&]v=([0-9A-Za-z_-]{11})",
        r"youtu\.be/([0-9A-Za-z_-]{11})",
        r"/embed/([0-9A-Za-z_-]{11})",
        r"/shorts/([0-9A-Za-z_-]{11})",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Extract the 11-character video id from a YouTube URL.
///
/// Supports `watch?v=<id>` (with any other query parameters around it), `youtu.be/<id>`,
/// `/embed/<id>` and `/shorts/<id>`. Returns `None` when no pattern matches.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();

    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Like [`extract_video_id`], but a missing id is an error
pub fn require_video_id(url: &str) -> Result<String> {
    extract_video_id(url).ok_or_else(|| CondenserError::InvalidVideoUrl(url.trim().to_string()).into())
}

/// Transcript source backed by YouTube's caption tracks
pub struct YoutubeTranscriptSource {
    languages: Vec<String>,
}

impl YoutubeTranscriptSource {
    pub fn new(languages: Vec<String>) -> Self {
        let languages = if languages.is_empty() {
            vec!["en".to_string()]
        } else {
            languages
        };

        Self { languages }
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptEntry>> {
        tracing::debug!(
            "Fetching transcript for {} (languages: {})",
            video_id,
            self.languages.join(",")
        );

        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            CondenserError::TranscriptFetch(format!("Could not create transcript client: {}", e))
        })?;

        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        let transcript = api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| {
                CondenserError::TranscriptFetch(format!("Video {}: {}", video_id, e))
            })?;

        Ok(transcript
            .snippets
            .into_iter()
            .map(|snippet| TranscriptEntry::new(snippet.text, snippet.start, snippet.duration))
            .collect())
    }

    fn source_name(&self) -> &'static str {
        "YouTube"
    }
}

impl Default for YoutubeTranscriptSource {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "abcdefghijk";

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abcdefghijk").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_short_link() {
        assert_eq!(extract_video_id("https://youtu.be/abcdefghijk").as_deref(), Some(ID));
        assert_eq!(
            extract_video_id("https://youtu.be/abcdefghijk?feature=shared").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/abcdefghijk").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_shorts_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/abcdefghijk").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_extra_params_before_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?time_continue=1&v=abcdefghijk")
                .as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_extra_params_after_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abcdefghijk&feature=emb_title")
                .as_deref(),
            Some(ID)
        );
        assert_eq!(
            extract_video_id("  https://m.youtube.com/watch?v=abcdefghijk&t=120s\n").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_query_param_wins_over_path() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/zzzzzzzzzzz?v=abcdefghijk")
                .as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(extract_video_id("https://example.com/not-a-video"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?tv=abcdefghijk"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_require_video_id() {
        assert_eq!(require_video_id("https://youtu.be/abcdefghijk").unwrap(), ID);

        let err = require_video_id("https://example.com/not-a-video").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CondenserError>(),
            Some(CondenserError::InvalidVideoUrl(_))
        ));
    }

    #[test]
    fn test_default_languages() {
        assert_eq!(YoutubeTranscriptSource::default().languages, vec!["en"]);
        assert_eq!(
            YoutubeTranscriptSource::new(vec!["de".into(), "en".into()]).languages,
            vec!["de", "en"]
        );
    }
}
