//! # Keyphrase extraction pipeline (SIFRank, SIFRank+)
//!
//! Unsupervised keyphrase extraction based on
//! [SIFRank](https://ieeexplore.ieee.org/document/8954611): candidate phrases are proposed by a
//! part-of-speech chunking grammar, embedded by Smooth Inverse Frequency (SIF) weighted
//! averaging of contextual token embeddings, and ranked by cosine similarity with the document
//! embedding, with a boost for phrases appearing early in the text.
//!
//! The pipeline is stateless per request:
//! 1. the tagger tokenizes the text and stopwords are retagged so they cannot anchor a phrase,
//! 2. the chunking grammar extracts the candidates,
//! 3. tokens are embedded sentence by sentence (and over the whole document for SIFRank+),
//! 4. sentence and candidate embeddings are SIF-aggregated and their common component removed,
//! 5. candidates are scored, deduplicated (case-insensitive) and truncated to `top_n`.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use sif_rank::pipelines::embeddings::{LayerWeights, StaticEmbedder};
//! use sif_rank::pipelines::keyphrase_extraction::{SifRankConfig, SifRankModel};
//! use sif_rank::pipelines::pos_tagging::LexiconTagger;
//! use tch::Device;
//!
//! let tagger = LexiconTagger::from_file("path/to/lexicon.txt")?;
//! let embedder = StaticEmbedder::from_files(
//!     "path/to/embeddings.ot",
//!     "path/to/vocab.txt",
//!     "path/to/enwiki_vocab_min200.txt",
//!     Device::Cpu,
//! )?;
//! let model = SifRankModel::new(SifRankConfig::default(), tagger, embedder)?;
//!
//! let input = "Machine learning is a method of data analysis that automates analytical model building.";
//! let keyphrases = model.extract_and_rank(input, 3, &LayerWeights::default())?;
//! for keyphrase in keyphrases {
//!     println!("{}: {:.4}", keyphrase.candidate.text, keyphrase.score);
//! }
//! # Ok(())
//! # }
//! ```

mod candidates;
mod document;
mod pipeline;
mod scorer;
mod sif;
mod stopwords;

pub use candidates::{Candidate, ChunkGrammar};
pub use document::InputDocument;
pub use pipeline::{DocumentPooling, SifRankConfig, SifRankModel, SifRankVariant};
pub use scorer::{PositionDecay, RankedKeyphrase};
pub use sif::{CommonComponentRemoval, SifEmbedder};
pub use stopwords::ENGLISH_STOPWORDS;
