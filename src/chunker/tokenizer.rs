use std::path::Path;

use super::{Token, Tokenizer};
use crate::{CondenserError, Result};

/// Splits on whitespace; every word is one token
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut word_start = None;

        for (idx, ch) in text.char_indices() {
            if ch.is_whitespace() {
                if let Some(start) = word_start.take() {
                    tokens.push(Token::new(start, idx));
                }
            } else if word_start.is_none() {
                word_start = Some(idx);
            }
        }

        if let Some(start) = word_start {
            tokens.push(Token::new(start, text.len()));
        }

        Ok(tokens)
    }

    fn name(&self) -> &str {
        "whitespace"
    }
}

/// Hugging Face tokenizer (GPT-2 BPE by default)
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
    name: String,
}

impl HfTokenizer {
    /// Load a tokenizer from the Hugging Face hub, e.g. `gpt2`
    pub fn from_pretrained(identifier: &str) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_pretrained(identifier, None).map_err(|e| {
            CondenserError::Tokenizer(format!(
                "Failed to load pretrained tokenizer '{}': {}",
                identifier, e
            ))
        })?;

        Ok(Self {
            inner,
            name: identifier.to_string(),
        })
    }

    /// Load a serialized `tokenizer.json`
    pub fn from_file(path: &Path) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            CondenserError::Tokenizer(format!(
                "Failed to load tokenizer from {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self {
            inner,
            name: path.display().to_string(),
        })
    }

    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_bytes(bytes).map_err(|e| {
            CondenserError::Tokenizer(format!("Failed to deserialize tokenizer: {}", e))
        })?;

        Ok(Self {
            inner,
            name: "custom".to_string(),
        })
    }
}

impl Tokenizer for HfTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        let encoding = self.inner.encode(text, false).map_err(|e| {
            CondenserError::Tokenizer(format!("Failed to encode text: {}", e))
        })?;

        Ok(encoding
            .get_offsets()
            .iter()
            .map(|&(start, end)| Token::new(start, end))
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::TranscriptChunker;
    use std::sync::Arc;

    const WORD_LEVEL_JSON: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": { "[UNK]": 0, "the": 1, "cat": 2, "sat": 3 },
            "unk_token": "[UNK]"
        }
    }"#;

    #[test]
    fn test_whitespace_offsets() {
        let text = " hello  world\n";
        let tokens = WhitespaceTokenizer.tokenize(text).unwrap();

        assert_eq!(tokens, vec![Token::new(1, 6), Token::new(8, 13)]);
        assert_eq!(&text[tokens[1].start..tokens[1].end], "world");
    }

    #[test]
    fn test_whitespace_count() {
        assert_eq!(WhitespaceTokenizer.count_tokens("").unwrap(), 0);
        assert_eq!(WhitespaceTokenizer.count_tokens("a b\tc\n d").unwrap(), 4);
    }

    #[test]
    fn test_hf_tokenizer_offsets() {
        let tokenizer = HfTokenizer::from_bytes(WORD_LEVEL_JSON).unwrap();
        let tokens = tokenizer.tokenize("the cat sat").unwrap();

        assert_eq!(
            tokens,
            vec![Token::new(0, 3), Token::new(4, 7), Token::new(8, 11)]
        );
    }

    #[test]
    fn test_hf_tokenizer_drives_chunker() {
        let tokenizer = HfTokenizer::from_bytes(WORD_LEVEL_JSON).unwrap();
        let chunker = TranscriptChunker::new(Arc::new(tokenizer), 2);
        let chunks = chunker.chunk("the cat sat the dog").unwrap();

        let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["the cat", "sat the", "dog"]);
    }

    /// GPT-2 style byte-level BPE with no merges: one token per byte
    fn byte_level_tokenizer() -> HfTokenizer {
        use tokenizers::pre_tokenizers::byte_level::ByteLevel;

        let mut alphabet: Vec<char> = ByteLevel::alphabet().into_iter().collect();
        alphabet.sort_unstable();
        let vocab: serde_json::Map<String, serde_json::Value> = alphabet
            .iter()
            .enumerate()
            .map(|(id, ch)| (ch.to_string(), serde_json::json!(id)))
            .collect();

        let json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": {
                "type": "ByteLevel",
                "add_prefix_space": false,
                "trim_offsets": true,
                "use_regex": true
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "BPE",
                "dropout": null,
                "unk_token": null,
                "continuing_subword_prefix": null,
                "end_of_word_suffix": null,
                "fuse_unk": false,
                "byte_fallback": false,
                "vocab": vocab,
                "merges": []
            }
        });

        HfTokenizer::from_bytes(json.to_string()).unwrap()
    }

    #[test]
    fn test_byte_level_tokens_of_one_char_share_offsets() {
        let tokens = byte_level_tokenizer().tokenize("a \u{266a} b").unwrap();

        assert_eq!(tokens.len(), 7);
        assert!(tokens[2..5].iter().all(|t| (t.start, t.end) == (2, 5)));
    }

    #[test]
    fn test_multibyte_char_keeps_its_weight() {
        let tokenizer: Arc<dyn Tokenizer> = Arc::new(byte_level_tokenizer());
        let text = "a \u{266a} b";

        for max_tokens in [1, 2] {
            let chunker = TranscriptChunker::new(Arc::clone(&tokenizer), max_tokens);
            let chunks = chunker.chunk(text).unwrap();

            let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
            assert_eq!(texts, vec!["a", "\u{266a}", "b"]);
            assert_eq!(
                chunks.iter().map(|c| c.token_count).collect::<Vec<_>>(),
                vec![1, 3, 1]
            );
            for chunk in &chunks {
                assert_eq!(chunk.token_count, tokenizer.count_tokens(&chunk.text).unwrap());
            }
        }
    }

    #[test]
    fn test_byte_level_chunks_respect_bound() {
        let chunker = TranscriptChunker::new(Arc::new(byte_level_tokenizer()), 4);
        let text = "caf\u{e9} na\u{ef}ve \u{266a}\u{266a} r\u{e9}sum\u{e9}";

        let chunks = chunker.chunk(text).unwrap();
        let rejoined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rejoined.replace(' ', ""), text.replace(' ', ""));

        for chunk in &chunks {
            let single_char = chunk.text.chars().count() == 1;
            assert!(chunk.token_count <= 4 || single_char, "{:?}", chunk);
            assert_eq!(chunk.token_count, chunker.count_tokens(&chunk.text).unwrap());
        }
    }

    #[test]
    fn test_invalid_tokenizer_json() {
        let err = HfTokenizer::from_bytes("{ not json").err().unwrap();
        assert!(matches!(
            err.downcast_ref::<CondenserError>(),
            Some(CondenserError::Tokenizer(_))
        ));
    }
}
