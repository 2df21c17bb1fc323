//! Unsupervised keyphrase extraction (SIFRank, SIFRank+)
//!
//! This crate extracts and ranks keyphrases from short texts without supervision. Candidate
//! phrases are proposed by a deterministic part-of-speech chunking grammar, then ranked by the
//! cosine similarity between their Smooth Inverse Frequency (SIF) embedding and the document
//! embedding, corrected by a positional boost favoring phrases appearing early in the text.
//!
//! The part-of-speech tagger and the contextual embedding model are external collaborators,
//! plugged in through the [`Tagger`](pipelines::pos_tagging::Tagger) and
//! [`Embedder`](pipelines::embeddings::Embedder) traits. Lightweight implementations backed by
//! a lexicon ([`LexiconTagger`](pipelines::pos_tagging::LexiconTagger)) and a multi-layer
//! embedding table ([`StaticEmbedder`](pipelines::embeddings::StaticEmbedder)) are provided.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use sif_rank::pipelines::embeddings::{LayerWeights, StaticEmbedder};
//! use sif_rank::pipelines::keyphrase_extraction::{SifRankConfig, SifRankModel};
//! use sif_rank::pipelines::pos_tagging::LexiconTagger;
//! use sif_rank::Config;
//! use tch::Device;
//!
//! let config = SifRankConfig::from_file("path/to/sifrank_config.json")?;
//! let tagger = LexiconTagger::from_file("path/to/lexicon.txt")?;
//! let embedder = StaticEmbedder::from_files(
//!     "path/to/embeddings.ot",
//!     "path/to/vocab.txt",
//!     "path/to/enwiki_vocab_min200.txt",
//!     Device::cuda_if_available(),
//! )?;
//! let model = SifRankModel::new(config, tagger, embedder)?;
//!
//! let keyphrases = model.extract_and_rank(
//!     "Machine learning is a method of data analysis.",
//!     15,
//!     &LayerWeights::from([0.0, 1.0, 0.0]),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! # Loading the embeddings
//!
//! The `StaticEmbedder` expects a libtorch archive with one `(vocabulary, dimension)` tensor per
//! layer, named `layer_0`, `layer_1`... A NumPy `.npz` archive with the same layout can be
//! converted using the `convert-tensor` binary:
//!
//! ```bash
//! cargo run --bin=convert-tensor -- path/to/embeddings.npz path/to/embeddings.ot
//! ```

pub mod common;
pub mod pipelines;

pub use common::error::SifRankError;
pub use common::Config;
