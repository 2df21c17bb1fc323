//! Noun phrase chunking over part-of-speech tags.
//!
//! Each grammar is a pattern `M* H{min,max}` over a small alphabet of tag classes, matched
//! leftmost-greedy with backtracking (the semantics of the equivalent regular expression
//! over the tag string):
//!
//! | Grammar              | Pattern                                  |
//! |----------------------|------------------------------------------|
//! | `NounPhrase`         | `<NN.*\|JJ>*<NN.*>`                      |
//! | `ModifiedNounPhrase` | `<JJ\|VBG>*<NN.*>{0,3}`                  |
//! | `ExtendedNounPhrase` | `<NN.*\|JJ\|VBG\|VBN>*<NN.*>`            |

use crate::pipelines::pos_tagging::TaggedToken;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagClass {
    Noun,
    Adjective,
    Gerund,
    Participle,
    Other,
}

impl TagClass {
    fn from_label(label: &str) -> TagClass {
        match label {
            "NN" | "NNS" | "NNP" | "NNPS" => TagClass::Noun,
            "JJ" => TagClass::Adjective,
            "VBG" => TagClass::Gerund,
            "VBN" => TagClass::Participle,
            _ => TagClass::Other,
        }
    }
}

struct ChunkPattern {
    modifiers: &'static [TagClass],
    heads: &'static [TagClass],
    min_heads: usize,
    max_heads: Option<usize>,
}

const NOUN_PHRASE: ChunkPattern = ChunkPattern {
    modifiers: &[TagClass::Noun, TagClass::Adjective],
    heads: &[TagClass::Noun],
    min_heads: 1,
    max_heads: None,
};

const MODIFIED_NOUN_PHRASE: ChunkPattern = ChunkPattern {
    modifiers: &[TagClass::Adjective, TagClass::Gerund],
    heads: &[TagClass::Noun],
    min_heads: 0,
    max_heads: Some(3),
};

const EXTENDED_NOUN_PHRASE: ChunkPattern = ChunkPattern {
    modifiers: &[
        TagClass::Noun,
        TagClass::Adjective,
        TagClass::Gerund,
        TagClass::Participle,
    ],
    heads: &[TagClass::Noun],
    min_heads: 1,
    max_heads: None,
};

impl ChunkPattern {
    /// End (exclusive) of the longest match starting at `start`, if any.
    fn match_at(&self, classes: &[TagClass], start: usize) -> Option<usize> {
        let modifier_run = classes[start..]
            .iter()
            .take_while(|class| self.modifiers.contains(class))
            .count();

        // Back off from the longest modifier run until the head constraint holds
        for modifier_count in (0..=modifier_run).rev() {
            let head_start = start + modifier_count;
            let head_count = classes[head_start..]
                .iter()
                .take(self.max_heads.unwrap_or(usize::MAX))
                .take_while(|class| self.heads.contains(class))
                .count();
            if head_count >= self.min_heads && modifier_count + head_count > 0 {
                return Some(head_start + head_count);
            }
        }
        None
    }
}

/// # Chunking grammar used to propose candidate phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkGrammar {
    /// Nouns and adjectives followed by a noun
    NounPhrase,
    /// Adjectives and gerunds followed by up to three nouns
    ModifiedNounPhrase,
    /// Nouns, adjectives, gerunds and past participles followed by a noun
    ExtendedNounPhrase,
}

impl Default for ChunkGrammar {
    fn default() -> Self {
        ChunkGrammar::NounPhrase
    }
}

/// # Candidate keyphrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Whitespace-joined surface form of the tokens
    pub text: String,
    /// Index of the first token of the phrase
    pub start: usize,
    /// Index following the last token of the phrase
    pub end: usize,
}

impl Candidate {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl ChunkGrammar {
    fn pattern(&self) -> &'static ChunkPattern {
        match self {
            ChunkGrammar::NounPhrase => &NOUN_PHRASE,
            ChunkGrammar::ModifiedNounPhrase => &MODIFIED_NOUN_PHRASE,
            ChunkGrammar::ExtendedNounPhrase => &EXTENDED_NOUN_PHRASE,
        }
    }

    /// Extracts the candidate phrases of a tagged token sequence, in text order.
    ///
    /// # Arguments
    ///
    /// * `tokens` - tagged tokens (stopwords are expected to carry a non-content tag)
    ///
    /// # Returns
    ///
    /// * `Vec<Candidate>` non-overlapping candidates. Repeated phrases are kept.
    ///
    /// # Example
    ///
    /// ```
    /// use sif_rank::pipelines::keyphrase_extraction::ChunkGrammar;
    /// use sif_rank::pipelines::pos_tagging::TaggedToken;
    ///
    /// let tokens = [
    ///     TaggedToken::new("deep", "JJ"),
    ///     TaggedToken::new("neural", "JJ"),
    ///     TaggedToken::new("networks", "NNS"),
    ///     TaggedToken::new("learn", "VBP"),
    /// ];
    /// let candidates = ChunkGrammar::NounPhrase.extract_candidates(&tokens);
    /// assert_eq!(candidates[0].text, "deep neural networks");
    /// assert_eq!(candidates[0].span(), 0..3);
    /// ```
    pub fn extract_candidates(&self, tokens: &[TaggedToken]) -> Vec<Candidate> {
        let pattern = self.pattern();
        let classes = tokens
            .iter()
            .map(|token| TagClass::from_label(&token.label))
            .collect::<Vec<TagClass>>();

        let mut candidates = Vec::new();
        let mut position = 0;
        while position < classes.len() {
            match pattern.match_at(&classes, position) {
                Some(end) => {
                    let text = tokens[position..end]
                        .iter()
                        .map(|token| token.word.as_str())
                        .collect::<Vec<&str>>()
                        .join(" ");
                    candidates.push(Candidate {
                        text,
                        start: position,
                        end,
                    });
                    position = end;
                }
                None => position += 1,
            }
        }
        candidates
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tag(pairs: &[(&str, &str)]) -> Vec<TaggedToken> {
        pairs
            .iter()
            .map(|(word, label)| TaggedToken::new(*word, *label))
            .collect()
    }

    fn texts(candidates: &[Candidate]) -> Vec<&str> {
        candidates
            .iter()
            .map(|candidate| candidate.text.as_str())
            .collect()
    }

    #[test]
    fn test_noun_phrase_backs_off_to_last_noun() {
        let tokens = tag(&[
            ("large", "JJ"),
            ("language", "NN"),
            ("models", "NNS"),
            ("open", "JJ"),
            ("are", "VBP"),
            ("powerful", "JJ"),
        ]);

        let candidates = ChunkGrammar::NounPhrase.extract_candidates(&tokens);

        assert_eq!(texts(&candidates), vec!["large language models"]);
        assert_eq!(candidates[0].span(), 0..3);
    }

    #[test]
    fn test_stopwords_break_phrases() {
        let tokens = tag(&[
            ("Machine", "NN"),
            ("learning", "NN"),
            ("is", "IN"),
            ("a", "IN"),
            ("method", "NN"),
            ("of", "IN"),
            ("data", "NNS"),
            ("analysis", "NN"),
            (".", "."),
        ]);

        let candidates = ChunkGrammar::NounPhrase.extract_candidates(&tokens);

        assert_eq!(
            candidates,
            vec![
                Candidate {
                    text: "Machine learning".to_string(),
                    start: 0,
                    end: 2
                },
                Candidate {
                    text: "method".to_string(),
                    start: 4,
                    end: 5
                },
                Candidate {
                    text: "data analysis".to_string(),
                    start: 6,
                    end: 8
                },
            ]
        );
    }

    #[test]
    fn test_modified_noun_phrase_caps_heads() {
        let tokens = tag(&[
            ("running", "VBG"),
            ("water", "NN"),
            ("supply", "NN"),
            ("chain", "NN"),
            ("issues", "NNS"),
            ("is", "IN"),
            ("green", "JJ"),
        ]);

        let candidates = ChunkGrammar::ModifiedNounPhrase.extract_candidates(&tokens);

        assert_eq!(
            texts(&candidates),
            vec!["running water supply chain", "issues", "green"]
        );
        assert_eq!(candidates[1].span(), 4..5);
    }

    #[test]
    fn test_extended_noun_phrase_accepts_participles() {
        let tokens = tag(&[
            ("the", "IN"),
            ("trained", "VBN"),
            ("embedding", "VBG"),
            ("model", "NN"),
            ("trained", "VBN"),
        ]);

        assert_eq!(
            texts(&ChunkGrammar::ExtendedNounPhrase.extract_candidates(&tokens)),
            vec!["trained embedding model"]
        );
        assert_eq!(
            texts(&ChunkGrammar::NounPhrase.extract_candidates(&tokens)),
            vec!["model"]
        );
    }

    #[test]
    fn test_empty_and_noun_free_inputs() {
        assert!(ChunkGrammar::NounPhrase.extract_candidates(&[]).is_empty());
        let tokens = tag(&[("quickly", "RB"), ("red", "JJ"), ("ran", "VBD")]);
        assert!(ChunkGrammar::NounPhrase
            .extract_candidates(&tokens)
            .is_empty());
    }

    #[test]
    fn test_spans_are_in_bounds_and_ordered() {
        let labels = ["NN", "JJ", "IN", "NNS", "VBG", "NNP", "JJ", "JJ", "NN", "."];
        for grammar in [
            ChunkGrammar::NounPhrase,
            ChunkGrammar::ModifiedNounPhrase,
            ChunkGrammar::ExtendedNounPhrase,
        ] {
            for length in 0..=labels.len() {
                let tokens = labels[..length]
                    .iter()
                    .enumerate()
                    .map(|(index, label)| TaggedToken::new(format!("w{}", index), *label))
                    .collect::<Vec<TaggedToken>>();
                let candidates = grammar.extract_candidates(&tokens);
                let mut previous_end = 0;
                for candidate in &candidates {
                    assert!(candidate.start >= previous_end);
                    assert!(candidate.start < candidate.end);
                    assert!(candidate.end <= tokens.len());
                    previous_end = candidate.end;
                }
                assert_eq!(candidates, grammar.extract_candidates(&tokens));
            }
        }
    }
}
