/// Generate: samples text from a trained model at one or more temperatures.
///
/// Usage: generate [--artifacts-dir <dir>] [--model <model.ron>] [--config <settings.ron>]
///                 [--seed <text>] [--length <n>] [--temperature <t> [<t> ...]]
///                 [--seq-length <n>] [--rng-seed <n>] [--verbose]
use char_style_engine::core::config::Settings;
use char_style_engine::core::generator::{GenerationOutput, Generator};
use char_style_engine::core::ngram;
use char_style_engine::core::vocab::Vocabulary;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

const USAGE: &str = "Usage: generate [--artifacts-dir <dir>] [--model <model.ron>] \
[--config <settings.ron>] [--seed <text>] [--length <n>] [--temperature <t> [<t> ...]] \
[--seq-length <n>] [--rng-seed <n>] [--verbose]";

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut artifacts_dir = PathBuf::from("artifacts");
    let mut model_path = None;
    let mut config_path = None;
    let mut seed_text = None;
    let mut length = None;
    let mut temperatures: Vec<f64> = Vec::new();
    let mut seq_length = None;
    let mut rng_seed = None;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--artifacts-dir" if i + 1 < args.len() => {
                i += 1;
                artifacts_dir = PathBuf::from(&args[i]);
            }
            "--model" if i + 1 < args.len() => {
                i += 1;
                model_path = Some(PathBuf::from(&args[i]));
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(PathBuf::from(&args[i]));
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed_text = Some(args[i].clone());
            }
            "--length" if i + 1 < args.len() => {
                i += 1;
                length = Some(parse_or_exit::<usize>(&args[i], "--length"));
            }
            "--temperature" if i + 1 < args.len() => {
                // consume values up to the next flag
                while i + 1 < args.len() && !args[i + 1].starts_with("--") {
                    i += 1;
                    temperatures.push(parse_or_exit(&args[i], "--temperature"));
                }
            }
            "--seq-length" if i + 1 < args.len() => {
                i += 1;
                seq_length = Some(parse_or_exit::<usize>(&args[i], "--seq-length"));
            }
            "--rng-seed" if i + 1 < args.len() => {
                i += 1;
                rng_seed = Some(parse_or_exit::<u64>(&args[i], "--rng-seed"));
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

    let mut settings = match config_path {
        Some(ref path) => Settings::load_from_ron(path).unwrap_or_else(|e| {
            eprintln!("Error loading config '{}': {}", path.display(), e);
            process::exit(1);
        }),
        None => Settings::default(),
    };
    if let Some(n) = seq_length {
        settings.generator.seq_length = n;
    }

    let limits = &settings.limits;
    let seed_text = seed_text.unwrap_or_else(|| limits.default_seed.clone());
    let length = length.unwrap_or(limits.default_length);
    if temperatures.is_empty() {
        temperatures = limits.sweep_temperatures.clone();
    }

    if let Err(e) = limits.check_length(length) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
    for &t in &temperatures {
        if let Err(e) = limits.check_temperature(t) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    let vocab = Vocabulary::load(&artifacts_dir).unwrap_or_else(|e| {
        eprintln!(
            "Error loading vocabulary from '{}': {}",
            artifacts_dir.display(),
            e
        );
        process::exit(1);
    });
    let model_path = model_path.unwrap_or_else(|| artifacts_dir.join("model.ron"));
    let model = ngram::load_model(&model_path).unwrap_or_else(|e| {
        eprintln!("Error loading model '{}': {}", model_path.display(), e);
        process::exit(1);
    });

    let generator = Generator::builder()
        .vocabulary(Arc::new(vocab))
        .model(Arc::new(model))
        .config(settings.generator.clone())
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        });

    let mut rng = match rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!("Seed text: {:?}", seed_text);
    println!("Length: {}", length);
    println!("Temperatures: {:?}", temperatures);

    let results = generator.sweep(&seed_text, length, &temperatures, &mut rng);
    let total = results.len();
    let mut failed = false;
    for (n, (temperature, output)) in results.iter().enumerate() {
        println!("\n{}", "=".repeat(70));
        println!("  [{}/{}] Temperature: {}", n + 1, total, temperature);
        println!("{}", "=".repeat(70));
        failed |= !print_output(output);
    }

    if failed {
        process::exit(1);
    }
}

/// Print one generation result. Returns false if it ended in an error.
fn print_output(output: &GenerationOutput) -> bool {
    println!("{}", output.text());
    match &output.error {
        Some(e) => {
            eprintln!(
                "ERROR after {} of {} characters: {}",
                output.generated.chars().count(),
                output.requested,
                e
            );
            false
        }
        None => true,
    }
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
