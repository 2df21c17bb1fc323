//! # Token embedding providers
//!
//! The keyphrase pipeline consumes token embeddings through the [`Embedder`] trait: one
//! contextual vector per token, obtained by mixing the provider's internal layers with
//! caller-supplied [`LayerWeights`], and a reference unigram probability per token used
//! for SIF weighting.
//!
//! [`StaticEmbedder`] is a provider backed by a multi-layer embedding table saved with
//! `tch::Tensor::save_multi` (see the `convert-tensor` utility to create one from a NumPy
//! `.npz` archive):
//!
//! ```no_run
//! # fn main() -> Result<(), sif_rank::SifRankError> {
//! use sif_rank::pipelines::embeddings::{Embedder, LayerWeights, StaticEmbedder};
//! use tch::Device;
//!
//! let embedder = StaticEmbedder::from_files(
//!     "path/to/embeddings.ot",
//!     "path/to/vocab.txt",
//!     "path/to/enwiki_vocab_min200.txt",
//!     Device::Cpu,
//! )?;
//! let embeddings = embedder.embed_tokens(&["data", "analysis"], &LayerWeights::default())?;
//! # Ok(())
//! # }
//! ```

mod frequencies;
mod layers;
mod static_embedder;

pub use frequencies::WordFrequencyTable;
pub use layers::LayerWeights;
pub use static_embedder::StaticEmbedder;

use crate::SifRankError;
use tch::Tensor;

/// # Provider of contextual token embeddings
pub trait Embedder {
    /// Embeds a sequence of tokens, the sequence providing the context of every token.
    ///
    /// # Arguments
    ///
    /// * `tokens` - tokens to embed, in text order
    /// * `layer_weights` - weight of each of the provider's layers in the output vectors
    ///
    /// # Returns
    ///
    /// * `Tensor` of shape (*tokens*, *embedding dimension*). Fails with `SifRankError::EmbeddingError`
    fn embed_tokens(
        &self,
        tokens: &[&str],
        layer_weights: &LayerWeights,
    ) -> Result<Tensor, SifRankError>;

    /// Estimated unigram probability of a token in a reference corpus. Tokens missing
    /// from the reference must get a small, strictly positive fallback probability.
    fn reference_probability(&self, token: &str) -> f64;
}
