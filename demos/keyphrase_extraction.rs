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

extern crate anyhow;

use sif_rank::pipelines::embeddings::{LayerWeights, StaticEmbedder, WordFrequencyTable};
use sif_rank::pipelines::keyphrase_extraction::{SifRankConfig, SifRankModel};
use sif_rank::pipelines::pos_tagging::LexiconTagger;
use std::collections::HashMap;
use tch::{Device, Kind, Tensor};
use tracing_subscriber::EnvFilter;

const LEXICON: &[(&str, &str)] = &[
    ("rust", "NNP"),
    ("is", "VBZ"),
    ("a", "DT"),
    ("multi-paradigm", "JJ"),
    ("programming", "NN"),
    ("language", "NN"),
    ("designed", "VBN"),
    ("for", "IN"),
    ("performance", "NN"),
    ("and", "CC"),
    ("safety", "NN"),
    ("especially", "RB"),
    ("safe", "JJ"),
    ("concurrency", "NN"),
    ("memory", "NN"),
    ("enforces", "VBZ"),
    ("without", "IN"),
    ("garbage", "NN"),
    ("collector", "NN"),
];

/// Random three-layer embeddings over the lexicon vocabulary, standing in for a pretrained model.
fn synthetic_embedder() -> anyhow::Result<StaticEmbedder> {
    tch::manual_seed(42);
    let vocab = LEXICON
        .iter()
        .map(|(word, _)| word.to_string())
        .collect::<Vec<String>>();
    let layers = (0..3)
        .map(|_| Tensor::randn([vocab.len() as i64, 64], (Kind::Float, Device::Cpu)))
        .collect::<Vec<Tensor>>();
    let frequencies = WordFrequencyTable::new(vec![
        ("is", 9_000u64),
        ("a", 12_000),
        ("and", 11_000),
        ("for", 8_000),
        ("without", 900),
        ("language", 300),
        ("programming", 150),
        ("memory", 120),
        ("performance", 100),
        ("safety", 80),
        ("concurrency", 10),
        ("garbage", 20),
        ("collector", 15),
    ]);
    Ok(StaticEmbedder::new(layers, vocab, frequencies)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Either `embeddings.ot vocab.txt frequencies.txt` or nothing for a synthetic embedder
    let args = std::env::args().skip(1).collect::<Vec<String>>();
    let embedder = match args.as_slice() {
        [weights, vocab, frequencies] => {
            StaticEmbedder::from_files(weights, vocab, frequencies, Device::cuda_if_available())?
        }
        _ => synthetic_embedder()?,
    };
    let lexicon = LEXICON
        .iter()
        .map(|(word, label)| (word.to_string(), label.to_string()))
        .collect::<HashMap<String, String>>();

    let model = SifRankModel::new(
        SifRankConfig::default(),
        LexiconTagger::new(lexicon),
        embedder,
    )?;

    let input = [
        "Rust is a multi-paradigm programming language designed for performance and safety, \
        especially safe concurrency. Rust enforces memory safety without a garbage collector.",
    ];

    let output = model.predict(&input, 5, &LayerWeights::from([0.0, 1.0, 0.0]))?;
    for keyphrases in output {
        for keyphrase in keyphrases {
            println!(
                "{} (similarity: {:.4}, score: {:.4})",
                keyphrase.candidate.text, keyphrase.similarity, keyphrase.score
            );
        }
    }

    Ok(())
}
