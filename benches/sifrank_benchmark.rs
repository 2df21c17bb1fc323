#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use sif_rank::pipelines::embeddings::{LayerWeights, StaticEmbedder, WordFrequencyTable};
use sif_rank::pipelines::keyphrase_extraction::{SifRankConfig, SifRankModel, SifRankVariant};
use sif_rank::pipelines::pos_tagging::LexiconTagger;
use std::collections::HashMap;
use tch::{Device, Kind, Tensor};

const VOCAB_SIZE: usize = 2000;
const EMBEDDING_DIM: i64 = 256;

fn word(index: usize) -> String {
    format!("word{}", index)
}

fn create_model(variant: SifRankVariant) -> SifRankModel {
    tch::manual_seed(0);
    let vocab = (0..VOCAB_SIZE).map(word).collect::<Vec<String>>();
    let layers = (0..3)
        .map(|_| Tensor::randn([VOCAB_SIZE as i64, EMBEDDING_DIM], (Kind::Float, Device::Cpu)))
        .collect::<Vec<Tensor>>();
    let frequencies =
        WordFrequencyTable::new((0..VOCAB_SIZE).map(|i| (word(i), (i % 97 + 1) as u64)));
    let lexicon = (0..VOCAB_SIZE)
        .map(|i| {
            let label = match i % 5 {
                0 => "JJ",
                1 => "VBZ",
                2 => "DT",
                _ => "NN",
            };
            (word(i), label.to_string())
        })
        .collect::<HashMap<String, String>>();
    let embedder = StaticEmbedder::new(layers, vocab, frequencies).unwrap();
    let config = SifRankConfig {
        variant,
        ..Default::default()
    };
    SifRankModel::new(config, LexiconTagger::new(lexicon), embedder).unwrap()
}

fn create_document(sentences: usize, sentence_length: usize) -> String {
    (0..sentences)
        .map(|sentence| {
            let words = (0..sentence_length)
                .map(|position| word((sentence * 31 + position * 7) % VOCAB_SIZE))
                .collect::<Vec<String>>();
            format!("{}.", words.join(" "))
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn bench_sifrank(c: &mut Criterion) {
    let document = create_document(20, 25);
    let layer_weights = LayerWeights::default();
    let _guard = tch::no_grad_guard();

    let model = create_model(SifRankVariant::SifRank);
    c.bench_function("SIFRank extraction", |b| {
        b.iter(|| model.extract_and_rank(black_box(&document), 15, &layer_weights))
    });

    let model = create_model(SifRankVariant::SifRankPlus);
    c.bench_function("SIFRank+ extraction", |b| {
        b.iter(|| model.extract_and_rank(black_box(&document), 15, &layer_weights))
    });
}

criterion_group! {
name = benches;
config = Criterion::default().sample_size(10);
targets = bench_sifrank
}

criterion_main!(benches);
