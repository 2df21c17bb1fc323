// Copyright 2019 Guillaume Becquin
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Part Of Speech tagging
//! Splits a text into tokens annotated with Penn Treebank part-of-speech tags (NN, VBZ, JJ...).
//!
//! The keyphrase pipeline only relies on the [`Tagger`] trait, so any tagger (e.g. a
//! transformer-based token classifier) can be plugged in. A lightweight lexicon and
//! suffix based tagger, [`LexiconTagger`], is provided for English:
//!
//! ```no_run
//! # fn main() -> Result<(), sif_rank::SifRankError> {
//! use sif_rank::pipelines::pos_tagging::{LexiconTagger, Tagger};
//!
//! let tagger = LexiconTagger::from_file("path/to/lexicon.txt")?;
//! let output = tagger.tag("My name is Amélie. How are you?")?;
//! # Ok(())
//! # }
//! ```
//! Output, for a lexicon holding the closed-class words (`my`, `how`, `you`...): \
//! ```no_run
//! # use sif_rank::pipelines::pos_tagging::TaggedToken;
//! # let output =
//! [
//!     TaggedToken::new("My", "PRP$"),
//!     TaggedToken::new("name", "NN"),
//!     TaggedToken::new("is", "VBZ"),
//!     TaggedToken::new("Amélie", "NNP"),
//!     TaggedToken::new(".", "."),
//!     TaggedToken::new("How", "WRB"),
//!     TaggedToken::new("are", "VBP"),
//!     TaggedToken::new("you", "PRP"),
//!     TaggedToken::new("?", "."),
//! ]
//! # ;
//! ```
//!
//! Without a lexicon entry, words fall back on the suffix rules (`My` and `How` would be
//! tagged `NN`, `are` `NN`, `you` `NN`).

use crate::SifRankError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Tag forced on stopwords so that they can never be part of a candidate phrase
pub const NON_CONTENT_TAG: &str = "IN";

/// Tag used for sentence-final punctuation
pub const SENTENCE_END_TAG: &str = ".";

// Numbers and dotted abbreviations are kept whole so that their periods do not end a sentence
const DEFAULT_TOKEN_PATTERN: &str =
    r"(?u)\d+(?:[.,]\d+)*\b|(?:\w\.){2,}|\w+(?:[-'’]\w+)*|[^\w\s]";

const ADJECTIVE_SUFFIXES: [&str; 9] = [
    "ous", "ive", "able", "ible", "ful", "less", "ical", "ic", "al",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// # Token annotated with its part-of-speech tag
pub struct TaggedToken {
    /// String representation of the token
    pub word: String,
    /// Part-of-speech label (e.g. NN, VB...)
    pub label: String,
}

impl TaggedToken {
    pub fn new<W: Into<String>, L: Into<String>>(word: W, label: L) -> TaggedToken {
        TaggedToken {
            word: word.into(),
            label: label.into(),
        }
    }

    /// Returns `true` if the token closes a sentence (`.`, `!`, `?` or `;`)
    pub fn is_sentence_end(&self) -> bool {
        self.label == SENTENCE_END_TAG || matches!(self.word.as_str(), "." | "!" | "?" | ";")
    }

    /// Returns `true` for nouns (`NN`, `NNS`, `NNP`, `NNPS`) and plain adjectives (`JJ`)
    pub fn is_content(&self) -> bool {
        self.label.starts_with("NN") || self.label == "JJ"
    }
}

/// # Tagger producing the token sequence of a text
pub trait Tagger {
    /// Tokenizes and tags a text.
    ///
    /// # Arguments
    ///
    /// * `text` - text to tag
    ///
    /// # Returns
    ///
    /// * `Vec<TaggedToken>` tokens in text order. Fails with `SifRankError::TaggingError`
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, SifRankError>;
}

/// # Lexicon-based Part of Speech tagger
///
/// Looks words up in a lexicon (case-insensitive) and falls back on closed-class rules
/// (numbers, punctuation), capitalization and suffix heuristics for unknown words.
pub struct LexiconTagger {
    lexicon: HashMap<String, String>,
    pattern: Regex,
}

impl LexiconTagger {
    /// Build a new `LexiconTagger` from an in-memory lexicon.
    ///
    /// # Arguments
    ///
    /// * `lexicon` - map from (lower-cased) words to their tag
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sif_rank::pipelines::pos_tagging::LexiconTagger;
    /// use std::collections::HashMap;
    ///
    /// let mut lexicon = HashMap::new();
    /// lexicon.insert("learning".to_string(), "NN".to_string());
    /// let tagger = LexiconTagger::new(lexicon);
    /// ```
    pub fn new(lexicon: HashMap<String, String>) -> LexiconTagger {
        let lexicon = lexicon
            .into_iter()
            .map(|(word, label)| (word.to_lowercase(), label))
            .collect();
        // The pattern is a compile-time constant known to be valid
        let pattern = Regex::new(DEFAULT_TOKEN_PATTERN).unwrap();
        LexiconTagger { lexicon, pattern }
    }

    /// Build a new `LexiconTagger` from a lexicon file containing one `word TAG` pair per line.
    /// Empty lines and lines starting with `#` are ignored.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<LexiconTagger, SifRankError> {
        let f = File::open(path.as_ref())?;
        let mut lexicon = HashMap::new();
        for (line_number, line) in BufReader::new(f).lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(word), Some(label), None) => {
                    lexicon.insert(word.to_string(), label.to_string());
                }
                _ => {
                    return Err(SifRankError::TaggingError(format!(
                        "Invalid lexicon entry at line {} of {}: expected `word TAG`, got `{}`",
                        line_number + 1,
                        path.as_ref().display(),
                        line
                    )));
                }
            }
        }
        Ok(LexiconTagger::new(lexicon))
    }

    fn guess_label(&self, word: &str, sentence_start: bool) -> String {
        if let Some(label) = self.lexicon.get(&word.to_lowercase()) {
            return label.clone();
        }
        if word.chars().all(|c| c.is_numeric() || c == '.' || c == ',')
            && word.chars().any(char::is_numeric)
        {
            return "CD".to_string();
        }
        if !word.chars().any(char::is_alphanumeric) {
            return match word {
                "." | "!" | "?" => SENTENCE_END_TAG,
                "," => ",",
                _ => ":",
            }
            .to_string();
        }
        if !sentence_start && word.chars().next().map_or(false, char::is_uppercase) {
            return "NNP".to_string();
        }
        if word.len() > 1 && word.ends_with('.') {
            return "FW".to_string();
        }
        let lower_cased = word.to_lowercase();
        let label = if lower_cased.len() > 4 && lower_cased.ends_with("ing") {
            "VBG"
        } else if lower_cased.len() > 3 && lower_cased.ends_with("ed") {
            "VBN"
        } else if lower_cased.len() > 3 && lower_cased.ends_with("ly") {
            "RB"
        } else if ADJECTIVE_SUFFIXES
            .iter()
            .any(|suffix| lower_cased.len() > suffix.len() + 2 && lower_cased.ends_with(suffix))
        {
            "JJ"
        } else if lower_cased.len() > 3 && lower_cased.ends_with('s') && !lower_cased.ends_with("ss")
        {
            "NNS"
        } else {
            "NN"
        };
        label.to_string()
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, SifRankError> {
        let mut tokens: Vec<TaggedToken> = Vec::new();
        let mut sentence_start = true;
        for hit in self.pattern.find_iter(text) {
            let word = hit.as_str();
            let token = TaggedToken::new(word, self.guess_label(word, sentence_start));
            sentence_start = token.is_sentence_end();
            tokens.push(token);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn labels(tokens: &[TaggedToken]) -> Vec<&str> {
        tokens.iter().map(|token| token.label.as_str()).collect()
    }

    #[test]
    fn test_fallback_rules() {
        let tagger = LexiconTagger::new(HashMap::new());
        let tokens = tagger
            .tag("Rust compilers generated 42 fast binaries, visiting Paris quickly.")
            .unwrap();

        let words: Vec<&str> = tokens.iter().map(|token| token.word.as_str()).collect();
        assert_eq!(
            words,
            vec![
                "Rust",
                "compilers",
                "generated",
                "42",
                "fast",
                "binaries",
                ",",
                "visiting",
                "Paris",
                "quickly",
                "."
            ]
        );
        assert_eq!(
            labels(&tokens),
            vec!["NN", "NNS", "VBN", "CD", "NN", "NNS", ",", "VBG", "NNP", "RB", "."]
        );
    }

    #[test]
    fn test_numbers_and_abbreviations_are_single_tokens() {
        let tagger = LexiconTagger::new(HashMap::new());
        let tokens = tagger
            .tag("Prices rose 3.5 percent, e.g. in Europe. Sales fell 1,200 units.")
            .unwrap();

        let words: Vec<&str> = tokens.iter().map(|token| token.word.as_str()).collect();
        assert_eq!(
            words,
            vec![
                "Prices", "rose", "3.5", "percent", ",", "e.g.", "in", "Europe", ".", "Sales",
                "fell", "1,200", "units", "."
            ]
        );
        assert_eq!(tokens[2].label, "CD");
        assert_eq!(tokens[5].label, "FW");
        assert_eq!(tokens[11].label, "CD");
        let sentence_ends = tokens
            .iter()
            .filter(|token| token.is_sentence_end())
            .count();
        assert_eq!(sentence_ends, 2);
    }

    #[test]
    fn test_lexicon_takes_precedence() {
        let mut lexicon = HashMap::new();
        lexicon.insert("Learning".to_string(), "NN".to_string());
        lexicon.insert("is".to_string(), "VBZ".to_string());
        let tagger = LexiconTagger::new(lexicon);

        let tokens = tagger.tag("Machine learning is useful").unwrap();

        assert_eq!(labels(&tokens), vec!["NN", "NN", "VBZ", "JJ"]);
    }

    #[test]
    fn test_lexicon_file() -> anyhow::Result<()> {
        let mut lexicon_file = tempfile::NamedTempFile::new()?;
        writeln!(lexicon_file, "# word tag")?;
        writeln!(lexicon_file, "data NNS")?;
        writeln!(lexicon_file)?;
        writeln!(lexicon_file, "analysis NN")?;
        let tagger = LexiconTagger::from_file(lexicon_file.path())?;

        let tokens = tagger.tag("data analysis")?;

        assert_eq!(labels(&tokens), vec!["NNS", "NN"]);
        Ok(())
    }

    #[test]
    fn test_malformed_lexicon_file() -> anyhow::Result<()> {
        let mut lexicon_file = tempfile::NamedTempFile::new()?;
        writeln!(lexicon_file, "data NNS extra")?;

        let result = LexiconTagger::from_file(lexicon_file.path());

        assert!(matches!(result, Err(SifRankError::TaggingError(_))));
        Ok(())
    }

    #[test]
    fn test_sentence_end() {
        assert!(TaggedToken::new(".", ".").is_sentence_end());
        assert!(TaggedToken::new(";", ":").is_sentence_end());
        assert!(!TaggedToken::new(",", ",").is_sentence_end());
    }
}
