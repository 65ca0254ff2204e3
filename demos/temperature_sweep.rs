/// Temperature sweep example: trains a small n-gram model on a bundled
/// passage and samples the same seed at several temperatures.
///
/// Low temperatures stay close to the most likely continuation; high ones
/// drift toward noise.
///
/// Run with: cargo run --example temperature_sweep

use char_style_engine::core::corpus;
use char_style_engine::core::generator::Generator;
use char_style_engine::core::ngram::NGramModel;
use char_style_engine::core::vocab::Vocabulary;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn main() {
    let raw = std::fs::read_to_string("tests/fixtures/test_corpus.txt")
        .expect("Failed to read bundled corpus");
    let text = corpus::clean_text(&raw.to_lowercase());

    let vocab = Vocabulary::from_corpus(&text).expect("Failed to build vocabulary");
    let indices = vocab.encode_str(&text).expect("Failed to encode corpus");
    let model = NGramModel::train(&indices, vocab.len(), 5).expect("Failed to train model");

    let generator = Generator::builder()
        .vocabulary(Arc::new(vocab))
        .model(Arc::new(model))
        .build()
        .expect("Failed to build generator");

    let mut rng = StdRng::seed_from_u64(1869);
    for (temperature, output) in
        generator.sweep("the old man looked at", 160, &[0.2, 0.5, 1.0, 1.2], &mut rng)
    {
        println!("--- temperature {} ---", temperature);
        match output.into_result() {
            Ok(text) => println!("{}\n", text),
            Err(e) => println!("ERROR: {}\n", e),
        }
    }
}
