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

use crate::common::Config;
use crate::pipelines::embeddings::{Embedder, LayerWeights};
use crate::pipelines::keyphrase_extraction::candidates::ChunkGrammar;
use crate::pipelines::keyphrase_extraction::document::InputDocument;
use crate::pipelines::keyphrase_extraction::scorer::{
    merge_occurrences, KeyphraseScorer, PositionDecay, RankedKeyphrase,
};
use crate::pipelines::keyphrase_extraction::sif::{
    CommonComponentRemoval, SifEmbedder, MIN_SENTENCES,
};
use crate::pipelines::keyphrase_extraction::stopwords::ENGLISH_STOPWORDS;
use crate::pipelines::pos_tagging::Tagger;
use crate::SifRankError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;
use tch::{Kind, Tensor};
use tracing::{debug, warn};

/// # Keyphrase ranking variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SifRankVariant {
    /// Candidates embedded in their sentence context, every occurrence scored on its own
    SifRank,
    /// Candidates embedded in the context of the whole document, occurrences of a phrase averaged
    SifRankPlus,
}

/// # Document embedding strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentPooling {
    /// Mean of the sentence embeddings
    SentenceMean,
    /// SIF average of the nouns and adjectives of the document
    ContentTokens,
}

/// # Configuration for keyphrase extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SifRankConfig {
    /// Ranking variant
    pub variant: SifRankVariant,
    /// Chunking grammar proposing the candidates
    pub grammar: ChunkGrammar,
    /// SIF smoothing constant `a`
    pub smoothing: f64,
    /// Remove the first principal component of the sentence embeddings
    pub remove_common_component: bool,
    /// Document embedding strategy
    pub document_pooling: DocumentPooling,
    /// Positional boost of early candidates
    pub position_decay: PositionDecay,
    /// Custom stopwords replacing the default English list
    pub stopwords: Option<Vec<String>>,
}

impl Default for SifRankConfig {
    fn default() -> Self {
        SifRankConfig {
            variant: SifRankVariant::SifRankPlus,
            grammar: ChunkGrammar::NounPhrase,
            smoothing: 1.0,
            remove_common_component: true,
            document_pooling: DocumentPooling::SentenceMean,
            position_decay: PositionDecay::default(),
            stopwords: None,
        }
    }
}

impl Config for SifRankConfig {}

/// # SIFRank keyphrase extraction model
///
/// Owns the tagger and the embedder for its whole lifetime: the model is built once (loading
/// the embeddings and the reference frequencies) and then serves any number of requests,
/// each request working on its own `InputDocument`. Dropping the model releases the resources.
pub struct SifRankModel {
    tagger: Box<dyn Tagger + Send>,
    embedder: Box<dyn Embedder + Send>,
    sif: SifEmbedder,
    stopwords: HashSet<String>,
    variant: SifRankVariant,
    grammar: ChunkGrammar,
    remove_common_component: bool,
    document_pooling: DocumentPooling,
    position_decay: PositionDecay,
}

impl SifRankModel {
    /// Build a new `SifRankModel`
    ///
    /// # Arguments
    ///
    /// * `config` - `SifRankConfig` object containing the ranking options
    /// * `tagger` - part-of-speech tagger used to tokenize the inputs
    /// * `embedder` - provider of contextual token embeddings and reference frequencies
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use sif_rank::pipelines::embeddings::StaticEmbedder;
    /// use sif_rank::pipelines::keyphrase_extraction::{SifRankConfig, SifRankModel};
    /// use sif_rank::pipelines::pos_tagging::LexiconTagger;
    /// use tch::Device;
    ///
    /// let tagger = LexiconTagger::from_file("path/to/lexicon.txt")?;
    /// let embedder = StaticEmbedder::from_files(
    ///     "path/to/embeddings.ot",
    ///     "path/to/vocab.txt",
    ///     "path/to/enwiki_vocab_min200.txt",
    ///     Device::cuda_if_available(),
    /// )?;
    /// let model = SifRankModel::new(SifRankConfig::default(), tagger, embedder)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new<T, E>(
        config: SifRankConfig,
        tagger: T,
        embedder: E,
    ) -> Result<SifRankModel, SifRankError>
    where
        T: Tagger + Send + 'static,
        E: Embedder + Send + 'static,
    {
        let sif = SifEmbedder::new(config.smoothing)?;
        config.position_decay.validate()?;
        let stopwords = match config.stopwords {
            Some(stopwords) => stopwords
                .into_iter()
                .map(|word| word.to_lowercase())
                .collect(),
            None => ENGLISH_STOPWORDS
                .iter()
                .map(|word| word.to_string())
                .collect(),
        };
        Ok(SifRankModel {
            tagger: Box::new(tagger),
            embedder: Box::new(embedder),
            sif,
            stopwords,
            variant: config.variant,
            grammar: config.grammar,
            remove_common_component: config.remove_common_component,
            document_pooling: config.document_pooling,
            position_decay: config.position_decay,
        })
    }

    /// Extracts and ranks the keyphrases of a text
    ///
    /// # Arguments
    ///
    /// * `text` - input text
    /// * `top_n` - maximum number of keyphrases to return
    /// * `layer_weights` - mixing weights of the embedding layers
    ///
    /// # Returns
    ///
    /// * `Vec<RankedKeyphrase>` by decreasing score. Empty for an empty text, `top_n == 0` or
    /// a text without candidate phrase.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// # use sif_rank::pipelines::embeddings::StaticEmbedder;
    /// # use sif_rank::pipelines::keyphrase_extraction::{SifRankConfig, SifRankModel};
    /// # use sif_rank::pipelines::pos_tagging::LexiconTagger;
    /// # let tagger = LexiconTagger::from_file("path/to/lexicon.txt")?;
    /// # let embedder = StaticEmbedder::from_files("embeddings.ot", "vocab.txt", "frequencies.txt", tch::Device::Cpu)?;
    /// use sif_rank::pipelines::embeddings::LayerWeights;
    ///
    /// let model = SifRankModel::new(SifRankConfig::default(), tagger, embedder)?;
    /// let keyphrases = model.extract_and_rank(
    ///     "Machine learning is a method of data analysis.",
    ///     3,
    ///     &LayerWeights::from([0.0, 1.0, 0.0]),
    /// )?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn extract_and_rank(
        &self,
        text: &str,
        top_n: usize,
        layer_weights: &LayerWeights,
    ) -> Result<Vec<RankedKeyphrase>, SifRankError> {
        if top_n == 0 || text.trim().is_empty() {
            return Ok(Vec::new());
        }
        layer_weights.validate()?;

        let document = InputDocument::new(self.tagger.tag(text)?, &self.stopwords, self.grammar);
        debug!(
            tokens = document.tokens().len(),
            candidates = document.candidates().len(),
            sentences = document.sentences().len(),
            "Extracted candidates"
        );
        if document.candidates().is_empty() {
            return Ok(Vec::new());
        }

        let words = document.words();
        let weights = self.sif.token_weights(self.embedder.as_ref(), &words);
        let sentence_token_embeddings = self.embed_sentences(&document, layer_weights)?;
        let sentence_embeddings =
            self.sif
                .embed_spans(&sentence_token_embeddings, &weights, document.sentences());

        let candidate_token_embeddings = match self.variant {
            SifRankVariant::SifRank => sentence_token_embeddings.shallow_clone(),
            SifRankVariant::SifRankPlus => {
                let embeddings = self.embedder.embed_tokens(&words, layer_weights)?;
                Self::check_embeddings(&embeddings, words.len(), sentence_embeddings.size()[1])?;
                embeddings
            }
        };
        let spans = document
            .candidates()
            .iter()
            .map(|candidate| candidate.span())
            .collect::<Vec<Range<usize>>>();
        let candidate_embeddings =
            self.sif
                .embed_spans(&candidate_token_embeddings, &weights, &spans);
        let (candidates, candidate_embeddings) = match self.variant {
            SifRankVariant::SifRank => (document.candidates().to_vec(), candidate_embeddings),
            SifRankVariant::SifRankPlus => {
                merge_occurrences(document.candidates(), &candidate_embeddings)
            }
        };
        debug!(
            variant = ?self.variant,
            scored_candidates = candidates.len(),
            "Embedded candidates"
        );

        let document_embedding = self.document_embedding(
            &document,
            &sentence_token_embeddings,
            &weights,
            &sentence_embeddings,
        );
        let common_component = if self.remove_common_component {
            let removal = CommonComponentRemoval::fit(&sentence_embeddings);
            if !removal.is_active() && document.sentences().len() >= MIN_SENTENCES {
                warn!(
                    sentences = document.sentences().len(),
                    "Null sentence embeddings, common component removal skipped"
                );
            }
            removal
        } else {
            CommonComponentRemoval::disabled()
        };
        let (candidate_embeddings, document_embedding) =
            match common_component.apply_to_document(&document_embedding) {
                Some(adjusted_document) => (
                    common_component.apply(&candidate_embeddings),
                    adjusted_document,
                ),
                None => {
                    warn!(
                        sentences = document.sentences().len(),
                        "Document embedding collapses onto the common component, removal skipped"
                    );
                    (candidate_embeddings, document_embedding)
                }
            };

        let keyphrases = KeyphraseScorer::new(self.position_decay, &self.stopwords).rank(
            &candidates,
            &candidate_embeddings,
            &document_embedding,
            top_n,
        );
        debug!(keyphrases = keyphrases.len(), "Ranked keyphrases");
        Ok(keyphrases)
    }

    /// Extracts and ranks the keyphrases of a batch of texts, failing on the first error
    ///
    /// # Arguments
    ///
    /// * `inputs` - texts to process
    /// * `top_n` - maximum number of keyphrases to return per text
    /// * `layer_weights` - mixing weights of the embedding layers
    ///
    /// # Returns
    ///
    /// * `Vec<Vec<RankedKeyphrase>>` one list of keyphrases per input
    pub fn predict<S>(
        &self,
        inputs: &[S],
        top_n: usize,
        layer_weights: &LayerWeights,
    ) -> Result<Vec<Vec<RankedKeyphrase>>, SifRankError>
    where
        S: AsRef<str>,
    {
        inputs
            .iter()
            .map(|input| self.extract_and_rank(input.as_ref(), top_n, layer_weights))
            .collect()
    }

    /// Token embeddings computed sentence by sentence, each sentence giving the context of its tokens
    fn embed_sentences(
        &self,
        document: &InputDocument,
        layer_weights: &LayerWeights,
    ) -> Result<Tensor, SifRankError> {
        let words = document.words();
        let mut embedding_dim = None;
        let mut sentence_embeddings = Vec::with_capacity(document.sentences().len());
        for sentence in document.sentences() {
            let embeddings = self
                .embedder
                .embed_tokens(&words[sentence.clone()], layer_weights)?;
            let dim = *embedding_dim
                .get_or_insert_with(|| embeddings.size().last().copied().unwrap_or(0));
            Self::check_embeddings(&embeddings, sentence.len(), dim)?;
            sentence_embeddings.push(embeddings.to_kind(Kind::Float));
        }
        Ok(Tensor::f_cat(&sentence_embeddings, 0)?)
    }

    fn check_embeddings(
        embeddings: &Tensor,
        token_count: usize,
        embedding_dim: i64,
    ) -> Result<(), SifRankError> {
        let shape = embeddings.size();
        if shape.len() != 2 || shape[0] != token_count as i64 || shape[1] != embedding_dim {
            return Err(SifRankError::EmbeddingError(format!(
                "Expected token embeddings of shape [{}, {}], got {:?}",
                token_count, embedding_dim, shape
            )));
        }
        Ok(())
    }

    /// Document embedding before common component removal
    fn document_embedding(
        &self,
        document: &InputDocument,
        token_embeddings: &Tensor,
        weights: &[f64],
        sentence_embeddings: &Tensor,
    ) -> Tensor {
        if let DocumentPooling::ContentTokens = self.document_pooling {
            let (content_positions, content_weights): (Vec<i64>, Vec<f64>) = document
                .tokens()
                .iter()
                .zip(weights.iter())
                .enumerate()
                .filter(|(_, (token, _))| token.is_content())
                .map(|(position, (_, weight))| (position as i64, *weight))
                .unzip();
            if !content_positions.is_empty() {
                let content_embeddings = token_embeddings.index_select(
                    0,
                    &Tensor::from_slice(&content_positions).to(token_embeddings.device()),
                );
                return self
                    .sif
                    .weighted_average(&content_embeddings, &content_weights);
            }
            debug!("No content token, document embedding falls back to the sentence mean");
        }
        sentence_embeddings.mean_dim([0i64].as_slice(), false, Kind::Float)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SifRankConfig::default();
        assert_eq!(config.variant, SifRankVariant::SifRankPlus);
        assert_eq!(config.grammar, ChunkGrammar::NounPhrase);
        assert_eq!(config.position_decay, PositionDecay::Inverse { offset: 3.4 });
    }

    #[test]
    fn test_partial_config_deserialization() -> anyhow::Result<()> {
        let config: SifRankConfig = serde_json::from_str(
            r#"{"variant": "SifRank", "position_decay": {"Exponential": {"rate": 0.05}}}"#,
        )?;

        assert_eq!(config.variant, SifRankVariant::SifRank);
        assert_eq!(config.position_decay, PositionDecay::Exponential { rate: 0.05 });
        assert_eq!(config.smoothing, 1.0);
        assert!(config.remove_common_component);
        Ok(())
    }
}
