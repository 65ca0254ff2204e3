/// Corpus Trainer: builds the vocabulary tables and an n-gram model from a text corpus.
///
/// Usage: corpus_trainer --data-dir <dir> [--artifacts-dir <dir>] [--sequence-length <n>]
///                       [--step <n>] [--order <n>] [--smoothing <k>] [--verbose]
use char_style_engine::core::corpus::{self, CorpusSummary};
use char_style_engine::core::ngram::{self, NGramModel};
use char_style_engine::core::vocab::Vocabulary;
use std::path::PathBuf;
use std::process;

const USAGE: &str = "Usage: corpus_trainer --data-dir <dir> [--artifacts-dir <dir>] \
[--sequence-length <n>] [--step <n>] [--order <n>] [--smoothing <k>] [--verbose]";

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut data_dir = None;
    let mut artifacts_dir = PathBuf::from("artifacts");
    let mut sequence_length = 40usize;
    let mut step = 3usize;
    let mut order = 6usize;
    let mut smoothing = ngram::DEFAULT_SMOOTHING;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data-dir" if i + 1 < args.len() => {
                i += 1;
                data_dir = Some(PathBuf::from(&args[i]));
            }
            "--artifacts-dir" if i + 1 < args.len() => {
                i += 1;
                artifacts_dir = PathBuf::from(&args[i]);
            }
            "--sequence-length" if i + 1 < args.len() => {
                i += 1;
                sequence_length = parse_or_exit(&args[i], "--sequence-length");
            }
            "--step" if i + 1 < args.len() => {
                i += 1;
                step = parse_or_exit(&args[i], "--step");
            }
            "--order" if i + 1 < args.len() => {
                i += 1;
                order = parse_or_exit(&args[i], "--order");
            }
            "--smoothing" if i + 1 < args.len() => {
                i += 1;
                smoothing = parse_or_exit(&args[i], "--smoothing");
            }
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("{}", USAGE);
                process::exit(1);
            }
        }
        i += 1;
    }

    init_tracing(verbose);

    let data_dir = data_dir.unwrap_or_else(|| {
        eprintln!("Error: --data-dir is required");
        eprintln!("{}", USAGE);
        process::exit(1);
    });

    let raw = corpus::load_dir(&data_dir).unwrap_or_else(|e| {
        eprintln!("Error reading corpus from '{}': {}", data_dir.display(), e);
        process::exit(1);
    });
    let text = corpus::clean_text(&raw);
    println!(
        "Corpus: {} characters after cleaning ({} before)",
        text.chars().count(),
        raw.chars().count()
    );

    let vocab = Vocabulary::from_corpus(&text).unwrap_or_else(|e| {
        eprintln!("Error building vocabulary: {}", e);
        process::exit(1);
    });
    println!("Vocabulary: {} characters {:?}", vocab.len(), vocab.chars());

    // Every character of the corpus is in its own vocabulary.
    let indices = vocab.encode_str(&text).unwrap_or_else(|e| {
        eprintln!("Error encoding corpus: {}", e);
        process::exit(1);
    });

    println!("Training {}-gram model...", order);
    let model = NGramModel::train(&indices, vocab.len(), order)
        .and_then(|m| m.with_smoothing(smoothing))
        .unwrap_or_else(|e| {
            eprintln!("Error training model: {}", e);
            process::exit(1);
        });
    println!("Model trained: {} contexts", model.counts.len());

    let summary = CorpusSummary::compute(&indices, vocab.len(), sequence_length, step)
        .unwrap_or_else(|e| {
            eprintln!("Error summarizing corpus: {}", e);
            process::exit(1);
        });

    vocab.save(&artifacts_dir).unwrap_or_else(|e| {
        eprintln!("Error saving vocabulary to '{}': {}", artifacts_dir.display(), e);
        process::exit(1);
    });

    let model_path = artifacts_dir.join("model.ron");
    ngram::save_model(&model, &model_path).unwrap_or_else(|e| {
        eprintln!("Error saving model to '{}': {}", model_path.display(), e);
        process::exit(1);
    });

    let summary_path = artifacts_dir.join("preprocessing_summary.json");
    let written = serde_json::to_string_pretty(&summary)
        .map_err(std::io::Error::from)
        .and_then(|json| std::fs::write(&summary_path, json));
    if let Err(e) = written {
        eprintln!("Error saving summary to '{}': {}", summary_path.display(), e);
        process::exit(1);
    }

    println!(
        "Training windows: {} of length {} (step {})",
        summary.num_sequences, summary.sequence_length, step
    );
    println!("Artifacts saved to '{}'", artifacts_dir.display());
}

fn parse_or_exit<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Error: invalid value '{}' for {}", value, flag);
        process::exit(1);
    })
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}
