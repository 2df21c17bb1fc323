use crate::pipelines::embeddings::{Embedder, LayerWeights, WordFrequencyTable};
use crate::SifRankError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tch::{Device, Kind, Tensor};

const LAYER_PREFIX: &str = "layer_";

/// # Embedder backed by a multi-layer embedding table
///
/// Each layer is a (*vocabulary*, *embedding dimension*) matrix. Tokens missing from the
/// vocabulary (after a lower-cased second lookup) are embedded as zero vectors.
pub struct StaticEmbedder {
    vocab: HashMap<String, i64>,
    layers: Tensor,
    unknown_index: i64,
    frequencies: WordFrequencyTable,
}

impl StaticEmbedder {
    /// Build a new `StaticEmbedder`
    ///
    /// # Arguments
    ///
    /// * `layers` - one (*vocabulary*, *embedding dimension*) `Tensor` per layer, all of the same shape
    /// * `vocab` - tokens, in the row order of the layer matrices
    /// * `frequencies` - reference frequencies used for SIF weighting
    pub fn new(
        layers: Vec<Tensor>,
        vocab: Vec<String>,
        frequencies: WordFrequencyTable,
    ) -> Result<StaticEmbedder, SifRankError> {
        let first_layer = layers.first().ok_or_else(|| {
            SifRankError::InvalidConfigurationError(
                "Static embeddings require at least one layer".to_string(),
            )
        })?;
        let shape = first_layer.size();
        if shape.len() != 2 || shape[0] != vocab.len() as i64 {
            return Err(SifRankError::InvalidConfigurationError(format!(
                "Expected layers of shape [{}, dim] matching the vocabulary, got {:?}",
                vocab.len(),
                shape
            )));
        }
        if let Some(layer) = layers.iter().find(|layer| layer.size() != shape) {
            return Err(SifRankError::InvalidConfigurationError(format!(
                "All embedding layers must share the shape {:?}, got {:?}",
                shape,
                layer.size()
            )));
        }

        let device = first_layer.device();
        let stacked = Tensor::stack(&layers, 0).to_kind(Kind::Float);
        let unknown_row = Tensor::zeros(
            [layers.len() as i64, 1, shape[1]],
            (Kind::Float, device),
        );
        let layers = Tensor::cat(&[stacked, unknown_row], 1);

        let vocab = vocab
            .into_iter()
            .enumerate()
            .map(|(index, token)| (token, index as i64))
            .collect::<HashMap<String, i64>>();
        let unknown_index = shape[0];
        Ok(StaticEmbedder {
            vocab,
            layers,
            unknown_index,
            frequencies,
        })
    }

    /// Loads a `StaticEmbedder` from disk.
    ///
    /// # Arguments
    ///
    /// * `weights_path` - archive saved with `Tensor::save_multi`, holding tensors named `layer_0`, `layer_1`...
    /// * `vocab_path` - vocabulary file with one token per line, in row order
    /// * `frequency_path` - reference frequency file with one `word count` pair per line
    /// * `device` - device to load the embeddings on
    pub fn from_files<W, V, F>(
        weights_path: W,
        vocab_path: V,
        frequency_path: F,
        device: Device,
    ) -> Result<StaticEmbedder, SifRankError>
    where
        W: AsRef<Path>,
        V: AsRef<Path>,
        F: AsRef<Path>,
    {
        let mut named_layers = Tensor::load_multi_with_device(weights_path, device)?
            .into_iter()
            .map(|(name, tensor)| {
                name.strip_prefix(LAYER_PREFIX)
                    .and_then(|index| index.parse::<usize>().ok())
                    .map(|index| (index, tensor))
                    .ok_or_else(|| {
                        SifRankError::InvalidConfigurationError(format!(
                            "Unexpected tensor `{}` in embeddings archive, expected `{}<index>`",
                            name, LAYER_PREFIX
                        ))
                    })
            })
            .collect::<Result<Vec<(usize, Tensor)>, SifRankError>>()?;
        named_layers.sort_by_key(|(index, _)| *index);
        let layers = named_layers
            .into_iter()
            .map(|(_, tensor)| tensor)
            .collect::<Vec<Tensor>>();

        let vocab = BufReader::new(File::open(vocab_path)?)
            .lines()
            .collect::<Result<Vec<String>, std::io::Error>>()?;
        let frequencies = WordFrequencyTable::from_file(frequency_path)?;

        StaticEmbedder::new(layers, vocab, frequencies)
    }

    pub fn embedding_dim(&self) -> i64 {
        self.layers.size()[2]
    }

    pub fn layer_count(&self) -> usize {
        self.layers.size()[0] as usize
    }

    fn token_index(&self, token: &str) -> i64 {
        self.vocab
            .get(token)
            .or_else(|| self.vocab.get(&token.to_lowercase()))
            .copied()
            .unwrap_or(self.unknown_index)
    }
}

impl Embedder for StaticEmbedder {
    fn embed_tokens(
        &self,
        tokens: &[&str],
        layer_weights: &LayerWeights,
    ) -> Result<Tensor, SifRankError> {
        let indices = tokens
            .iter()
            .map(|token| self.token_index(token))
            .collect::<Vec<i64>>();
        let indices = Tensor::from_slice(&indices).to(self.layers.device());
        layer_weights.mix(&self.layers.index_select(1, &indices))
    }

    fn reference_probability(&self, token: &str) -> f64 {
        self.frequencies.probability(token)
    }
}
