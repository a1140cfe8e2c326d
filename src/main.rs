// Command-line runner: classify one or more digit images with a set of trained
// weights.

use anyhow::{Context, Result};
use clap::Parser;
use digit_vision::core_modules::utils::image_helper::image_helper::{load_rgba, save_grid_png};
use digit_vision::core_modules::utils::weights_file::load_weights_json;
use digit_vision::pipeline::preprocess;
use digit_vision::{ClassifierConfig, ClassifierPool, SoftmaxMode};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recognize hand-drawn digits")]
struct Args {
    /// JSON file holding w1/b1, w2/b2, w3/b3.
    #[arg(long)]
    weights: PathBuf,
    /// Canvas images to classify (square, side divisible by 28).
    #[arg(required = true)]
    images: Vec<PathBuf>,
    /// Subtract the largest logit before exponentiating.
    #[arg(long, default_value_t = false)]
    stable_softmax: bool,
    /// Worker tasks; defaults to one per CPU.
    #[arg(long)]
    workers: Option<usize>,
    /// Print one JSON object per image instead of a text line.
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Directory to write each centered 28x28 input as a PNG.
    #[arg(long)]
    dump_grid: Option<PathBuf>,
}

#[derive(Serialize)]
struct ImageReport<'a> {
    path: String,
    #[serde(flatten)]
    classification: &'a digit_vision::Classification,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ClassifierConfig {
        softmax: if args.stable_softmax {
            SoftmaxMode::Stabilized
        } else {
            SoftmaxMode::Literal
        },
        workers: args.workers,
    };

    let weights = load_weights_json(&args.weights)
        .with_context(|| format!("loading weights from {}", args.weights.display()))?;
    let pool = ClassifierPool::new(&config, Arc::new(weights));

    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let image = load_rgba(path).with_context(|| format!("decoding {}", path.display()))?;
        images.push(image);
    }

    if let Some(dir) = &args.dump_grid {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        for (path, image) in args.images.iter().zip(&images) {
            let pre = preprocess(&image.as_buffer()?)
                .with_context(|| format!("preprocessing {}", path.display()))?;
            let stem = path.file_stem().unwrap_or_default().to_string_lossy();
            let out = dir.join(format!("{stem}_28x28.png"));
            save_grid_png(&out, &pre.grid).with_context(|| format!("writing {}", out.display()))?;
        }
    }

    let results = pool.classify_all(images).await;
    for (path, result) in args.images.iter().zip(results) {
        let classification =
            result.with_context(|| format!("classifying {}", path.display()))?;
        if args.json {
            let report = ImageReport {
                path: path.display().to_string(),
                classification: &classification,
            };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            let probabilities: Vec<String> = classification
                .prediction
                .probabilities()
                .iter()
                .map(|p| format!("{p:.3}"))
                .collect();
            println!(
                "{}: digit {} ({:.1}%){} [{}]",
                path.display(),
                classification.digit,
                classification.prediction.confidence() * 100.0,
                if classification.blank_canvas { " blank" } else { "" },
                probabilities.join(" ")
            );
        }
    }

    Ok(())
}
