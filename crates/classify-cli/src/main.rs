//! Image Classify CLI
//!
//! Command-line caller for the classification pipeline: list the models in
//! the assets directory, load one by name, classify an image, and print the
//! ranked result.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use image_classification::ImageClassifier;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// File extension identifying model artifacts in the assets directory.
const MODEL_EXTENSION: &str = "onnx";

#[derive(Parser)]
#[command(
    name = "image-classify",
    version,
    about = "Classify images with locally stored ONNX models",
    after_help = "EXAMPLES:\n  \
                  # List the models available in the assets directory\n  \
                  image-classify models\n\n  \
                  # Classify an image with a specific model\n  \
                  image-classify classify --model mobilenet_v2.onnx photo.jpg\n\n  \
                  # Machine-readable output\n  \
                  image-classify classify --model mobilenet_v2.onnx --json photo.jpg"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding model artifacts and labels.txt
    #[arg(long, global = true, default_value = "assets")]
    assets: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List model files available in the assets directory
    Models,

    /// Classify an image and print the top-3 labels
    Classify {
        /// Model file name inside the assets directory
        #[arg(long)]
        model: String,

        /// Image to classify
        image: PathBuf,

        /// Print the result as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Models => list_models(&cli.assets),
        Commands::Classify { model, image, json } => {
            classify(&cli.assets, &model, &image, json).await
        }
    }
}

/// List the model files in the assets directory, sorted by name.
fn list_models(assets: &Path) -> Result<()> {
    let entries = fs::read_dir(assets)
        .with_context(|| format!("Failed to read assets directory {}", assets.display()))?;

    let mut models: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(MODEL_EXTENSION))
        .filter_map(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .collect();
    models.sort();

    if models.is_empty() {
        println!(
            "No .{MODEL_EXTENSION} models found in {}",
            assets.display()
        );
    } else {
        for model in models {
            println!("{model}");
        }
    }
    Ok(())
}

async fn classify(assets: &Path, model: &str, image_path: &Path, json: bool) -> Result<()> {
    let classifier = ImageClassifier::new(assets);

    classifier
        .load_model_from_assets(model)
        .await
        .with_context(|| format!("Failed to load model {model}"))?;

    let image = image::open(image_path)
        .with_context(|| format!("Failed to open image {}", image_path.display()))?
        .to_rgb8();

    let result = classifier
        .classify(image)
        .await
        .context("Classification failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{result}");
    }

    classifier.close().await?;
    Ok(())
}
