use crate::pipelines::keyphrase_extraction::candidates::{Candidate, ChunkGrammar};
use crate::pipelines::pos_tagging::{TaggedToken, NON_CONTENT_TAG};
use std::collections::HashSet;
use std::ops::Range;

/// # Tagged input text with its candidate phrases
///
/// Built once per request: stopwords are retagged with a non-content tag before chunking,
/// and the document is never mutated afterwards.
#[derive(Debug, Clone)]
pub struct InputDocument {
    tokens: Vec<TaggedToken>,
    candidates: Vec<Candidate>,
    sentences: Vec<Range<usize>>,
}

impl InputDocument {
    /// Build a new `InputDocument`
    ///
    /// # Arguments
    ///
    /// * `tokens` - tagged tokens of the text
    /// * `stopwords` - lower-cased stopwords, retagged so that they cannot anchor a phrase
    /// * `grammar` - `ChunkGrammar` used to propose candidates
    pub fn new(
        mut tokens: Vec<TaggedToken>,
        stopwords: &HashSet<String>,
        grammar: ChunkGrammar,
    ) -> InputDocument {
        for token in tokens.iter_mut() {
            if stopwords.contains(&token.word.to_lowercase()) {
                token.label = NON_CONTENT_TAG.to_string();
            }
        }
        let candidates = grammar.extract_candidates(&tokens);
        let sentences = Self::split_sentences(&tokens);
        InputDocument {
            tokens,
            candidates,
            sentences,
        }
    }

    fn split_sentences(tokens: &[TaggedToken]) -> Vec<Range<usize>> {
        let mut sentences = Vec::new();
        let mut sentence_start = 0;
        for (position, token) in tokens.iter().enumerate() {
            if token.is_sentence_end() {
                sentences.push(sentence_start..position + 1);
                sentence_start = position + 1;
            }
        }
        if sentence_start < tokens.len() {
            sentences.push(sentence_start..tokens.len());
        }
        sentences
    }

    pub fn tokens(&self) -> &[TaggedToken] {
        &self.tokens
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Token ranges of the sentences, covering the whole token sequence in order
    pub fn sentences(&self) -> &[Range<usize>] {
        &self.sentences
    }

    pub fn words(&self) -> Vec<&str> {
        self.tokens.iter().map(|token| token.word.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
