//! Character tokenizer for VITS/MMS checkpoints
//!
//! The vocabulary maps single characters to ids (`vocab.json`); behaviour
//! switches come from `tokenizer_config.json`.

use crate::error::{SynthesisError, SynthesisResult};
use crate::types::TokenTensor;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

/// Settings read from `tokenizer_config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenizerConfig {
    /// Intersperse the pad id between characters
    #[serde(default = "default_true")]
    pub add_blank: bool,

    /// Lowercase characters the vocabulary does not know
    #[serde(default = "default_true")]
    pub normalize: bool,

    /// Model expects uroman-romanized input
    #[serde(default)]
    pub is_uroman: bool,

    /// ISO 639-3 language code of the checkpoint
    #[serde(default)]
    pub language: Option<String>,

    /// Vocabulary entry used for unknown characters when `normalize` is off
    #[serde(default = "default_unk_token")]
    pub unk_token: String,
}

fn default_true() -> bool {
    true
}

fn default_unk_token() -> String {
    "<unk>".to_string()
}

/// Id interspersed between characters when `add_blank` is set.
pub const BLANK_ID: i64 = 0;

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            add_blank: true,
            normalize: true,
            is_uroman: false,
            language: None,
            unk_token: default_unk_token(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VitsTokenizer {
    vocab: HashMap<String, i64>,
    chars: HashMap<char, i64>,
    config: TokenizerConfig,
}

impl VitsTokenizer {
    pub fn new(vocab: HashMap<String, i64>, config: TokenizerConfig) -> Self {
        let chars = vocab
            .iter()
            .filter_map(|(token, &id)| {
                let mut it = token.chars();
                match (it.next(), it.next()) {
                    (Some(c), None) => Some((c, id)),
                    _ => None,
                }
            })
            .collect();

        if config.is_uroman {
            log::warn!(
                "model expects uroman-romanized input; text is tokenized as given without romanization"
            );
        }

        Self {
            vocab,
            chars,
            config,
        }
    }

    /// Load `vocab.json` and, when present, `tokenizer_config.json`.
    pub fn from_files(vocab_path: &Path, config_path: Option<&Path>) -> SynthesisResult<Self> {
        let vocab: HashMap<String, i64> = serde_json::from_str(&read(vocab_path)?)
            .map_err(|err| {
                SynthesisError::Load(format!("invalid vocabulary {}: {err}", vocab_path.display()))
            })?;
        if vocab.is_empty() {
            return Err(SynthesisError::Load(format!(
                "vocabulary {} is empty",
                vocab_path.display()
            )));
        }

        let config = match config_path {
            Some(path) => serde_json::from_str(&read(path)?).map_err(|err| {
                SynthesisError::Load(format!(
                    "invalid tokenizer config {}: {err}",
                    path.display()
                ))
            })?,
            None => TokenizerConfig::default(),
        };

        Ok(Self::new(vocab, config))
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Lowercase every character that does not start a vocabulary entry.
    pub fn normalize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(c) = rest.chars().next() {
            match self.longest_vocab_prefix(rest) {
                Some(len) => {
                    out.push_str(&rest[..len]);
                    rest = &rest[len..];
                }
                None => {
                    out.extend(c.to_lowercase());
                    rest = &rest[c.len_utf8()..];
                }
            }
        }

        out
    }

    /// Encode text into a token tensor.
    ///
    /// With `normalize` on, characters outside the vocabulary are removed;
    /// otherwise they map to `unk_token`. Surrounding whitespace is stripped
    /// afterwards. Fails with a shape error when nothing is left, since the
    /// model cannot run on a blank sequence.
    pub fn encode(&self, text: &str) -> SynthesisResult<TokenTensor> {
        let text = if self.config.normalize {
            self.normalize(text)
        } else {
            text.to_string()
        };
        let text = self.preprocess_chars(text);

        let unk_id = if self.config.normalize {
            None
        } else {
            self.vocab.get(&self.config.unk_token).copied()
        };

        let mut dropped = BTreeSet::new();
        let kept: String = text
            .chars()
            .filter(|c| {
                let known = self.chars.contains_key(c) || unk_id.is_some();
                if !known {
                    dropped.insert(*c);
                }
                known
            })
            .collect();

        if !dropped.is_empty() {
            let dropped: String = dropped.into_iter().collect();
            log::warn!("characters not in the vocabulary were removed: {dropped:?}");
        }

        let kept = kept.trim();
        let ids: Vec<i64> = kept
            .chars()
            .filter_map(|c| self.chars.get(&c).copied().or(unk_id))
            .collect();

        if ids.is_empty() {
            return Err(SynthesisError::Shape(
                "input text produced no tokens after normalization".to_string(),
            ));
        }

        let ids = if self.config.add_blank {
            self.intersperse(&ids)
        } else {
            ids
        };
        log::debug!("encoded {} characters into {} tokens", kept.chars().count(), ids.len());

        TokenTensor::from_ids(ids)
    }

    fn longest_vocab_prefix(&self, text: &str) -> Option<usize> {
        self.vocab
            .keys()
            .filter(|token| !token.is_empty() && text.starts_with(token.as_str()))
            .map(String::len)
            .max()
    }

    fn preprocess_chars(&self, text: String) -> String {
        // Romanian checkpoints were trained on the cedilla form
        if self.config.language.as_deref() == Some("ron") {
            text.replace('\u{021B}', "\u{0163}")
        } else {
            text
        }
    }

    fn intersperse(&self, ids: &[i64]) -> Vec<i64> {
        let mut out = vec![BLANK_ID; ids.len() * 2 + 1];
        for (i, &id) in ids.iter().enumerate() {
            out[i * 2 + 1] = id;
        }
        out
    }
}

fn read(path: &Path) -> SynthesisResult<String> {
    fs::read_to_string(path)
        .map_err(|err| SynthesisError::Load(format!("failed to read {}: {err}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(entries: &[(&str, i64)]) -> HashMap<String, i64> {
        entries
            .iter()
            .map(|(token, id)| (token.to_string(), *id))
            .collect()
    }

    fn tokenizer(config: TokenizerConfig) -> VitsTokenizer {
        VitsTokenizer::new(
            vocab(&[("_", 0), (" ", 1), ("a", 2), ("b", 3), ("c", 4), ("<unk>", 5)]),
            config,
        )
    }

    #[test]
    fn test_encode_intersperses_pad() {
        let tok = tokenizer(TokenizerConfig::default());
        let tokens = tok.encode("ab c").unwrap();
        assert_eq!(tokens.to_vec(), vec![0, 2, 0, 3, 0, 1, 0, 4, 0]);
    }

    #[test]
    fn test_encode_without_blank() {
        let tok = tokenizer(TokenizerConfig {
            add_blank: false,
            ..TokenizerConfig::default()
        });
        assert_eq!(tok.encode("cab").unwrap().to_vec(), vec![4, 2, 3]);
    }

    #[test]
    fn test_unknown_uppercase_is_lowercased() {
        let tok = tokenizer(TokenizerConfig::default());
        assert_eq!(tok.normalize("AbC"), "abc");
        assert_eq!(
            tok.encode("AB").unwrap().to_vec(),
            tok.encode("ab").unwrap().to_vec()
        );
    }

    #[test]
    fn test_multi_char_vocab_entry_is_kept_by_normalize() {
        let tok = tokenizer(TokenizerConfig::default());
        assert_eq!(tok.normalize("A<unk>B"), "a<unk>b");
    }

    #[test]
    fn test_unknown_characters_are_dropped() {
        let tok = tokenizer(TokenizerConfig::default());
        assert_eq!(tok.encode("a!?b").unwrap().to_vec(), vec![0, 2, 0, 3, 0]);
    }

    #[test]
    fn test_empty_text_is_shape_error() {
        let tok = tokenizer(TokenizerConfig::default());
        match tok.encode("") {
            Err(SynthesisError::Shape(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_text_without_known_characters_is_shape_error() {
        let tok = tokenizer(TokenizerConfig::default());
        assert!(matches!(tok.encode("123!"), Err(SynthesisError::Shape(_))));
    }

    #[test]
    fn test_blank_is_always_id_zero() {
        let config: TokenizerConfig = serde_json::from_str(r#"{"pad_token": "<pad>"}"#).unwrap();
        let tok = VitsTokenizer::new(vocab(&[("k", 0), ("<pad>", 7), ("a", 3)]), config);
        assert_eq!(tok.encode("a").unwrap().to_vec(), vec![0, 3, 0]);
    }

    #[test]
    fn test_whitespace_only_text_is_shape_error() {
        let tok = tokenizer(TokenizerConfig::default());
        assert!(matches!(tok.encode("   "), Err(SynthesisError::Shape(_))));
        assert!(matches!(tok.encode(" \t\n "), Err(SynthesisError::Shape(_))));
    }

    #[test]
    fn test_surrounding_whitespace_is_stripped() {
        let tok = tokenizer(TokenizerConfig::default());
        assert_eq!(tok.encode(" a ").unwrap().to_vec(), vec![0, 2, 0]);
        // inner spaces survive
        assert_eq!(tok.encode("  a b  ").unwrap().to_vec(), vec![0, 2, 0, 1, 0, 3, 0]);
    }

    #[test]
    fn test_whitespace_left_by_dropped_characters_is_stripped() {
        let tok = tokenizer(TokenizerConfig::default());
        assert_eq!(tok.encode("!! a ??").unwrap().to_vec(), vec![0, 2, 0]);
    }

    #[test]
    fn test_unknown_characters_map_to_unk_without_normalize() {
        let tok = tokenizer(TokenizerConfig {
            normalize: false,
            add_blank: false,
            ..TokenizerConfig::default()
        });
        assert_eq!(tok.encode("a!B").unwrap().to_vec(), vec![2, 5, 5]);
    }

    #[test]
    fn test_unknown_characters_dropped_without_normalize_or_unk() {
        let tok = VitsTokenizer::new(
            vocab(&[("_", 0), ("a", 1)]),
            TokenizerConfig {
                normalize: false,
                add_blank: false,
                ..TokenizerConfig::default()
            },
        );
        assert_eq!(tok.encode("a?a").unwrap().to_vec(), vec![1, 1]);
    }

    #[test]
    fn test_romanian_t_comma_is_mapped() {
        let tok = VitsTokenizer::new(
            vocab(&[("_", 0), ("\u{0163}", 1)]),
            TokenizerConfig {
                language: Some("ron".to_string()),
                add_blank: false,
                ..TokenizerConfig::default()
            },
        );
        assert_eq!(tok.encode("\u{021B}").unwrap().to_vec(), vec![1]);
    }

    #[test]
    fn test_from_files_reads_vocab_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let vocab_path = dir.path().join("vocab.json");
        let config_path = dir.path().join("tokenizer_config.json");
        std::fs::write(&vocab_path, r#"{"_": 0, "o": 1, "k": 2}"#).unwrap();
        std::fs::write(
            &config_path,
            r#"{"add_blank": false, "normalize": true, "language": "pol", "unk_token": "<unk>"}"#,
        )
        .unwrap();

        let tok = VitsTokenizer::from_files(&vocab_path, Some(&config_path)).unwrap();
        assert_eq!(tok.vocab_size(), 3);
        assert!(!tok.config().add_blank);
        assert_eq!(tok.config().language.as_deref(), Some("pol"));
        assert_eq!(tok.encode("OK").unwrap().to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_from_files_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let vocab_path = dir.path().join("vocab.json");
        std::fs::write(&vocab_path, r#"{"_": 0, "a": 1}"#).unwrap();

        let tok = VitsTokenizer::from_files(&vocab_path, None).unwrap();
        assert_eq!(tok.config(), &TokenizerConfig::default());
    }

    #[test]
    fn test_invalid_vocab_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let vocab_path = dir.path().join("vocab.json");
        std::fs::write(&vocab_path, "not json").unwrap();

        match VitsTokenizer::from_files(&vocab_path, None) {
            Err(SynthesisError::Load(msg)) => assert!(msg.contains("invalid vocabulary")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
