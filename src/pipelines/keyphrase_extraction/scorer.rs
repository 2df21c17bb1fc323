use crate::common::tensor::cosine_similarity;
use crate::pipelines::keyphrase_extraction::candidates::Candidate;
use crate::SifRankError;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tch::{Kind, Tensor};

/// # Positional boost applied to candidate scores
///
/// The boost decreases with the index of the first token of the candidate, favoring
/// phrases that appear early in the text (title, lead sentence).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PositionDecay {
    /// `1 / (start + 1 + offset)`
    Inverse { offset: f64 },
    /// `exp(-rate * start)`
    Exponential { rate: f64 },
    /// No positional boost
    Disabled,
}

impl Default for PositionDecay {
    fn default() -> Self {
        PositionDecay::Inverse { offset: 3.4 }
    }
}

impl PositionDecay {
    pub fn validate(&self) -> Result<(), SifRankError> {
        let (name, value) = match self {
            PositionDecay::Inverse { offset } => ("offset", *offset),
            PositionDecay::Exponential { rate } => ("rate", *rate),
            PositionDecay::Disabled => return Ok(()),
        };
        if !value.is_finite() || value < 0.0 {
            return Err(SifRankError::InvalidConfigurationError(format!(
                "Position decay {} must be finite and non-negative, got {}",
                name, value
            )));
        }
        Ok(())
    }

    pub fn boost(&self, start: usize) -> f64 {
        match self {
            PositionDecay::Inverse { offset } => 1.0 / (start as f64 + 1.0 + offset),
            PositionDecay::Exponential { rate } => (-rate * start as f64).exp(),
            PositionDecay::Disabled => 0.0,
        }
    }

    /// Combines a similarity with the boost of a candidate starting at `start`. Equal to
    /// `similarity * (1 + boost)` for non-negative similarities, and never lower for an
    /// earlier candidate.
    pub fn apply(&self, similarity: f64, start: usize) -> f64 {
        similarity + similarity.abs() * self.boost(start)
    }
}

/// # Ranked keyphrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedKeyphrase {
    /// Candidate phrase (first occurrence for merged candidates)
    pub candidate: Candidate,
    /// Cosine similarity between the candidate and the document
    pub similarity: f64,
    /// Similarity adjusted by the positional boost
    pub score: f64,
}

/// Averages the embeddings of the occurrences of each (case-insensitive) phrase.
///
/// # Returns
///
/// * first occurrence of every distinct phrase, in text order
/// * `Tensor` of shape (*distinct phrases*, *embedding dimension*) with the averaged embeddings
pub(crate) fn merge_occurrences(
    candidates: &[Candidate],
    candidate_embeddings: &Tensor,
) -> (Vec<Candidate>, Tensor) {
    let mut groups: Vec<(Candidate, Vec<i64>)> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    for (position, candidate) in candidates.iter().enumerate() {
        let key = candidate.text.to_lowercase();
        match group_index.get(&key) {
            Some(index) => groups[*index].1.push(position as i64),
            None => {
                group_index.insert(key, groups.len());
                groups.push((candidate.clone(), vec![position as i64]));
            }
        }
    }
    if groups.is_empty() {
        return (Vec::new(), candidate_embeddings.shallow_clone());
    }

    let device = candidate_embeddings.device();
    let merged_embeddings = groups
        .iter()
        .map(|(_, occurrences)| {
            candidate_embeddings
                .index_select(0, &Tensor::from_slice(occurrences).to(device))
                .mean_dim([0i64].as_slice(), false, Kind::Float)
        })
        .collect::<Vec<Tensor>>();
    let candidates = groups.into_iter().map(|(candidate, _)| candidate).collect();
    (candidates, Tensor::stack(&merged_embeddings, 0))
}

/// # Candidate ranking against the document embedding
pub(crate) struct KeyphraseScorer<'a> {
    position_decay: PositionDecay,
    stopwords: &'a HashSet<String>,
}

impl<'a> KeyphraseScorer<'a> {
    pub(crate) fn new(
        position_decay: PositionDecay,
        stopwords: &'a HashSet<String>,
    ) -> KeyphraseScorer<'a> {
        KeyphraseScorer {
            position_decay,
            stopwords,
        }
    }

    fn is_valid(&self, candidate: &Candidate) -> bool {
        candidate.text.chars().count() > 1
            && !candidate
                .text
                .split_whitespace()
                .all(|word| self.stopwords.contains(&word.to_lowercase()))
    }

    /// Scores and ranks candidates.
    ///
    /// # Arguments
    ///
    /// * `candidates` - candidate phrases
    /// * `candidate_embeddings` - `Tensor` of shape (*candidates*, *embedding dimension*)
    /// * `document_embedding` - `Tensor` of shape (*embedding dimension*)
    /// * `top_n` - maximum number of keyphrases to return
    ///
    /// # Returns
    ///
    /// * `Vec<RankedKeyphrase>` by decreasing score (earlier candidate first on ties), at
    /// most one entry per case-insensitive phrase
    pub(crate) fn rank(
        &self,
        candidates: &[Candidate],
        candidate_embeddings: &Tensor,
        document_embedding: &Tensor,
        top_n: usize,
    ) -> Vec<RankedKeyphrase> {
        if candidates.is_empty() || top_n == 0 {
            return Vec::new();
        }
        let similarities = cosine_similarity(document_embedding, candidate_embeddings);

        let mut keyphrases: Vec<RankedKeyphrase> = Vec::new();
        let mut phrase_index: HashMap<String, usize> = HashMap::new();
        for (position, candidate) in candidates.iter().enumerate() {
            if !self.is_valid(candidate) {
                continue;
            }
            let similarity = similarities.double_value(&[position as i64]);
            let keyphrase = RankedKeyphrase {
                candidate: candidate.clone(),
                similarity,
                score: self.position_decay.apply(similarity, candidate.start),
            };
            let key = candidate.text.to_lowercase();
            match phrase_index.get(&key) {
                Some(index) => {
                    let current = &mut keyphrases[*index];
                    if keyphrase.score > current.score {
                        *current = keyphrase;
                    }
                }
                None => {
                    phrase_index.insert(key, keyphrases.len());
                    keyphrases.push(keyphrase);
                }
            }
        }

        keyphrases.sort_by(|a, b| {
            OrderedFloat(b.score)
                .cmp(&OrderedFloat(a.score))
                .then_with(|| a.candidate.start.cmp(&b.candidate.start))
        });
        keyphrases.truncate(top_n.max(1));
        keyphrases
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn candidate(text: &str, start: usize) -> Candidate {
        Candidate {
            text: text.to_string(),
            start,
            end: start + text.split_whitespace().count(),
        }
    }

    fn stopwords() -> HashSet<String> {
        ["the", "of", "this"].iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn test_position_decay_is_monotonic() {
        for decay in [
            PositionDecay::default(),
            PositionDecay::Exponential { rate: 0.1 },
            PositionDecay::Disabled,
        ] {
            for similarity in [0.8, 0.0, -0.3] {
                for start in 0..50 {
                    assert!(decay.apply(similarity, start) >= decay.apply(similarity, start + 1));
                }
            }
        }
        assert!((PositionDecay::default().boost(0) - 1.0 / 4.4).abs() < 1e-12);
        assert!((PositionDecay::Exponential { rate: 0.5 }.boost(0) - 1.0).abs() < 1e-12);
        assert_eq!(PositionDecay::Disabled.apply(0.5, 0), 0.5);
    }

    #[test]
    fn test_invalid_position_decay() {
        assert!(PositionDecay::Inverse { offset: -1.0 }.validate().is_err());
        assert!(PositionDecay::Exponential { rate: f64::NAN }
            .validate()
            .is_err());
        assert!(PositionDecay::Disabled.validate().is_ok());
    }

    #[test]
    fn test_rank_deduplicates_and_breaks_ties_by_position() {
        let stopwords = stopwords();
        let scorer = KeyphraseScorer::new(PositionDecay::Disabled, &stopwords);
        let candidates = vec![
            candidate("graph", 0),
            candidate("Neural network", 2),
            candidate("neural network", 6),
            candidate("tree", 9),
        ];
        let embeddings = Tensor::from_slice(&[
            1.0f32, 1.0, // graph
            0.0, 1.0, // Neural network
            1.0, 0.0, // neural network
            1.0, 1.0, // tree
        ])
        .view([4, 2]);
        let document = Tensor::from_slice(&[1.0f32, 0.0]);

        let ranked = scorer.rank(&candidates, &embeddings, &document, 10);

        let texts: Vec<&str> = ranked
            .iter()
            .map(|keyphrase| keyphrase.candidate.text.as_str())
            .collect();
        assert_eq!(texts, vec!["neural network", "graph", "tree"]);
        assert!((ranked[0].score - 1.0).abs() < 1e-6);
        assert!((ranked[1].score - ranked[2].score).abs() < 1e-12);
    }

    #[test]
    fn test_rank_filters_and_truncates() {
        let stopwords = stopwords();
        let scorer = KeyphraseScorer::new(PositionDecay::default(), &stopwords);
        let candidates = vec![
            candidate("x", 0),
            candidate("the this", 1),
            candidate("system", 3),
            candidate("design", 4),
        ];
        let embeddings = Tensor::ones([4, 3], (Kind::Float, tch::Device::Cpu));
        let document = Tensor::ones([3], (Kind::Float, tch::Device::Cpu));

        let ranked = scorer.rank(&candidates, &embeddings, &document, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].candidate.text, "system");
        assert!((ranked[0].similarity - 1.0).abs() < 1e-6);
        assert!((ranked[0].score - (1.0 + 1.0 / 7.4)).abs() < 1e-6);

        assert!(scorer.rank(&candidates, &embeddings, &document, 0).is_empty());
        assert!(scorer.rank(&[], &embeddings, &document, 5).is_empty());
        assert_eq!(scorer.rank(&candidates, &embeddings, &document, 100).len(), 2);
    }

    #[test]
    fn test_merge_occurrences() {
        let candidates = vec![
            candidate("Data", 0),
            candidate("model", 2),
            candidate("data", 5),
        ];
        let embeddings = Tensor::from_slice(&[2.0f32, 0.0, 1.0, 1.0, 0.0, 2.0]).view([3, 2]);

        let (merged, merged_embeddings) = merge_occurrences(&candidates, &embeddings);

        assert_eq!(merged, vec![candidate("Data", 0), candidate("model", 2)]);
        assert_eq!(merged_embeddings.size(), vec![2, 2]);
        assert!((merged_embeddings.double_value(&[0, 0]) - 1.0).abs() < 1e-6);
        assert!((merged_embeddings.double_value(&[0, 1]) - 1.0).abs() < 1e-6);
        assert!((merged_embeddings.double_value(&[1, 0]) - 1.0).abs() < 1e-6);
    }
}
