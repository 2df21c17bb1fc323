//! # Keyphrase extraction pipelines
//!
//! - [`pos_tagging`]: tokenization and part-of-speech tagging of the input text
//! - [`embeddings`]: contextual token embedding providers and reference frequencies
//! - [`keyphrase_extraction`]: candidate chunking, SIF aggregation and SIFRank/SIFRank+ ranking

pub mod embeddings;
pub mod keyphrase_extraction;
pub mod pos_tagging;
