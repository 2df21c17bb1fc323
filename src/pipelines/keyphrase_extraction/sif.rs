//! Smooth Inverse Frequency (SIF) aggregation of token embeddings, following
//! Arora et al., "A Simple but Tough-to-Beat Baseline for Sentence Embeddings" (ICLR 2017).

use crate::common::tensor::{first_principal_component, remove_projection};
use crate::pipelines::embeddings::Embedder;
use crate::SifRankError;
use std::ops::Range;
use tch::{Kind, Tensor};

/// # SIF weighted averaging of token embeddings
///
/// Each token vector is weighted by `a / (a + p(token))`, where `p` is the token reference
/// unigram probability and `a` the smoothing constant, and the weighted vectors are averaged.
#[derive(Debug, Clone, Copy)]
pub struct SifEmbedder {
    smoothing: f64,
}

impl SifEmbedder {
    pub fn new(smoothing: f64) -> Result<SifEmbedder, SifRankError> {
        if !smoothing.is_finite() || smoothing <= 0.0 {
            return Err(SifRankError::InvalidConfigurationError(format!(
                "SIF smoothing must be finite and strictly positive, got {}",
                smoothing
            )));
        }
        Ok(SifEmbedder { smoothing })
    }

    pub fn token_weight(&self, probability: f64) -> f64 {
        let probability = if probability.is_finite() {
            probability.max(0.0)
        } else {
            0.0
        };
        self.smoothing / (self.smoothing + probability)
    }

    /// SIF weights of a sequence of words, using the embedder reference frequencies
    pub fn token_weights<E>(&self, embedder: &E, words: &[&str]) -> Vec<f64>
    where
        E: Embedder + ?Sized,
    {
        words
            .iter()
            .map(|word| self.token_weight(embedder.reference_probability(&word.to_lowercase())))
            .collect()
    }

    /// Weighted average of token embeddings.
    ///
    /// # Arguments
    ///
    /// * `embeddings` - `Tensor` of shape (*tokens*, *embedding dimension*)
    /// * `weights` - SIF weight of each token
    ///
    /// # Returns
    ///
    /// * `Tensor` of shape (*embedding dimension*), a zero vector for an empty sequence
    pub fn weighted_average(&self, embeddings: &Tensor, weights: &[f64]) -> Tensor {
        let embedding_dim = embeddings.size()[1];
        if weights.is_empty() {
            return Tensor::zeros([embedding_dim], (Kind::Float, embeddings.device()));
        }
        let weights_tensor = Tensor::from_slice(weights)
            .to_kind(Kind::Float)
            .to(embeddings.device())
            .unsqueeze(1);
        (embeddings * weights_tensor).sum_dim_intlist([0i64].as_slice(), false, Kind::Float)
            / weights.len() as f64
    }

    /// Weighted averages of token spans.
    ///
    /// # Arguments
    ///
    /// * `embeddings` - `Tensor` of shape (*tokens*, *embedding dimension*) for the whole document
    /// * `weights` - SIF weight of each token of the document
    /// * `spans` - token ranges to aggregate
    ///
    /// # Returns
    ///
    /// * `Tensor` of shape (*spans*, *embedding dimension*)
    pub fn embed_spans<'a, I>(&self, embeddings: &Tensor, weights: &[f64], spans: I) -> Tensor
    where
        I: IntoIterator<Item = &'a Range<usize>>,
    {
        let span_embeddings = spans
            .into_iter()
            .map(|span| {
                self.weighted_average(
                    &embeddings.narrow(0, span.start as i64, span.len() as i64),
                    &weights[span.clone()],
                )
            })
            .collect::<Vec<Tensor>>();
        if span_embeddings.is_empty() {
            return Tensor::zeros([0, embeddings.size()[1]], (Kind::Float, embeddings.device()));
        }
        Tensor::stack(&span_embeddings, 0)
    }
}

/// Minimum number of sentences to estimate a common component. With two sentences the
/// component lies in their span and removing it leaves a single direction, unrelated to the
/// document content.
pub const MIN_SENTENCES: usize = 3;

/// Minimum fraction of its norm the document embedding must keep after removal.
const MIN_RETAINED_NORM: f64 = 0.1;

/// # Common discourse removal
///
/// Fitted once on all the sentence vectors of a document (first principal component),
/// then applied to every vector that has to be compared with the document.
pub struct CommonComponentRemoval {
    component: Option<Tensor>,
}

impl CommonComponentRemoval {
    /// Computes the common component of a (*sentences*, *embedding dimension*) matrix. Fewer
    /// than `MIN_SENTENCES` sentences, or a null matrix, leave vectors unchanged.
    pub fn fit(sentence_embeddings: &Tensor) -> CommonComponentRemoval {
        let component = if sentence_embeddings.size()[0] < MIN_SENTENCES as i64 {
            None
        } else {
            first_principal_component(sentence_embeddings)
        };
        CommonComponentRemoval { component }
    }

    pub fn disabled() -> CommonComponentRemoval {
        CommonComponentRemoval { component: None }
    }

    pub fn is_active(&self) -> bool {
        self.component.is_some()
    }

    /// Removes the common component from a (*vectors*, *embedding dimension*) matrix
    pub fn apply(&self, embeddings: &Tensor) -> Tensor {
        match &self.component {
            Some(component) => remove_projection(embeddings, component),
            None => embeddings.shallow_clone(),
        }
    }

    /// Removes the common component from a document embedding of shape (*embedding dimension*).
    ///
    /// # Returns
    ///
    /// * `None` if the document embedding is (almost) aligned with the common component: the
    /// residual would be numerical noise and the removal must not be applied.
    pub fn apply_to_document(&self, document_embedding: &Tensor) -> Option<Tensor> {
        let component = match &self.component {
            Some(component) => component,
            None => return Some(document_embedding.shallow_clone()),
        };
        let adjusted =
            remove_projection(&document_embedding.unsqueeze(0), component).squeeze_dim(0);
        let original_norm = document_embedding.norm().double_value(&[]);
        let adjusted_norm = adjusted.norm().double_value(&[]);
        if adjusted_norm < MIN_RETAINED_NORM * original_norm {
            None
        } else {
            Some(adjusted)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn embeddings() -> Tensor {
        Tensor::from_slice(&[1.0f32, 0.0, 0.0, 2.0, 4.0, 4.0]).view([3, 2])
    }

    #[test]
    fn test_token_weight() {
        let sif = SifEmbedder::new(1.0).unwrap();
        assert!((sif.token_weight(0.0) - 1.0).abs() < 1e-12);
        assert!((sif.token_weight(1.0) - 0.5).abs() < 1e-12);
        assert!((sif.token_weight(f64::NAN) - 1.0).abs() < 1e-12);

        let sif = SifEmbedder::new(1e-3).unwrap();
        assert!(sif.token_weight(1e-2) < sif.token_weight(1e-4));
    }

    #[test]
    fn test_invalid_smoothing() {
        assert!(SifEmbedder::new(0.0).is_err());
        assert!(SifEmbedder::new(-1.0).is_err());
        assert!(SifEmbedder::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_weighted_average() {
        let sif = SifEmbedder::new(1.0).unwrap();
        let average = sif.weighted_average(&embeddings().narrow(0, 0, 2), &[1.0, 0.5]);

        assert_eq!(average.size(), vec![2]);
        assert!((average.double_value(&[0]) - 0.5).abs() < 1e-6);
        assert!((average.double_value(&[1]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_sequence_gives_zero_vector() {
        let sif = SifEmbedder::new(1.0).unwrap();
        let average = sif.weighted_average(&embeddings().narrow(0, 0, 0), &[]);

        assert_eq!(average.size(), vec![2]);
        assert_eq!(average.abs().sum(Kind::Float).double_value(&[]), 0.0);
    }

    #[test]
    fn test_embed_spans() {
        let sif = SifEmbedder::new(1.0).unwrap();
        let spans = vec![0..1, 1..3];
        let span_embeddings = sif.embed_spans(&embeddings(), &[1.0, 1.0, 0.5], &spans);

        assert_eq!(span_embeddings.size(), vec![2, 2]);
        assert!((span_embeddings.double_value(&[0, 0]) - 1.0).abs() < 1e-6);
        assert!((span_embeddings.double_value(&[1, 0]) - 1.0).abs() < 1e-6);
        assert!((span_embeddings.double_value(&[1, 1]) - 2.0).abs() < 1e-6);

        let no_spans: Vec<Range<usize>> = vec![];
        assert_eq!(
            sif.embed_spans(&embeddings(), &[1.0, 1.0, 0.5], &no_spans)
                .size(),
            vec![0, 2]
        );
    }

    #[test]
    fn test_common_component_removal() {
        let sentences = Tensor::from_slice(&[3.0f32, 1.0, 3.0, -1.0, 3.0, 0.0]).view([3, 2]);
        let removal = CommonComponentRemoval::fit(&sentences);
        assert!(removal.is_active());

        let candidates = Tensor::from_slice(&[5.0f32, 2.0]).view([1, 2]);
        let adjusted = removal.apply(&candidates);

        assert!(adjusted.double_value(&[0, 0]).abs() < 1e-5);
        assert!((adjusted.double_value(&[0, 1]) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_short_documents_are_left_unchanged() {
        let sentence = Tensor::from_slice(&[3.0f32, 1.0]).view([1, 2]);
        let removal = CommonComponentRemoval::fit(&sentence);

        assert!(!removal.is_active());
        let adjusted = removal.apply(&sentence);
        assert!((adjusted.double_value(&[0, 0]) - 3.0).abs() < 1e-6);

        let sentences = Tensor::from_slice(&[1.0f32, 1.0, 0.0, 1.0, 0.0, 1.0]).view([2, 3]);
        let removal = CommonComponentRemoval::fit(&sentences);
        assert!(!removal.is_active());
        let document = sentences.mean_dim([0i64].as_slice(), false, Kind::Float);
        let adjusted = removal.apply_to_document(&document).unwrap();
        assert!((adjusted.double_value(&[0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_collapsed_document_is_rejected() {
        let sentences = Tensor::from_slice(&[1.0f32, 1.0, 2.0, 2.0, 1.0, 1.0]).view([3, 2]);
        let removal = CommonComponentRemoval::fit(&sentences);
        assert!(removal.is_active());

        let aligned_document = Tensor::from_slice(&[2.0f32, 2.0]);
        assert!(removal.apply_to_document(&aligned_document).is_none());

        let document = Tensor::from_slice(&[1.0f32, 0.0]);
        let adjusted = removal.apply_to_document(&document).unwrap();
        assert!((adjusted.double_value(&[0]) - 0.5).abs() < 1e-5);
        assert!((adjusted.double_value(&[1]) + 0.5).abs() < 1e-5);
    }
}
