use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use agrilens::{extract_location, ClassVocabulary, Classifier, TreatmentDatabase, DEFAULT_TOP_K};

/// Diagnose plant diseases from a leaf photo.
#[derive(Parser, Debug)]
#[command(name = "agrilens", version, about)]
struct Args {
    /// Path to the image file (JPEG, PNG, or WebP)
    image: Option<PathBuf>,

    /// Fetch the image from a URL instead of a local file
    #[arg(short, long)]
    url: Option<String>,

    /// Number of ranked predictions to show
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    top: usize,

    /// Path to a treatment database (JSON file or directory of .txt sheets)
    #[arg(short, long)]
    treatments: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let image_bytes = match (&args.image, &args.url) {
        (Some(path), None) => std::fs::read(path)
            .with_context(|| format!("failed to read image file {}", path.display()))?,
        (None, Some(url)) => fetch_image(url)?,
        _ => bail!("provide exactly one image source: a file path or --url"),
    };
    info!("loaded {} bytes of image data", image_bytes.len());

    let classifier = Classifier::builder()
        .with_vocabulary(ClassVocabulary::plant_village())
        .build()?;

    let start = Instant::now();
    let predictions = classifier.predict_top_k(&image_bytes, args.top);
    info!("prediction took {:?}", start.elapsed());

    println!("Predictions:");
    for prediction in &predictions {
        println!(
            "  {}. {} ({:.1}%)",
            prediction.rank,
            prediction.label,
            prediction.probability * 100.0
        );
    }

    if let Some(location) = extract_location(&image_bytes) {
        println!(
            "Location: {:.6}, {:.6}",
            location.latitude, location.longitude
        );
    }

    if let Some(path) = &args.treatments {
        let database = if path.is_dir() {
            TreatmentDatabase::from_text_dir(path)?
        } else {
            TreatmentDatabase::from_json_file(path)?
        };
        if let Some(top) = predictions.first() {
            match database.lookup(&top.label) {
                Some(treatment) => {
                    println!("\nTreatment for {}:", top.label);
                    println!("  {}", treatment.description);
                    if !treatment.organic_solutions.is_empty() {
                        println!("  Organic: {}", treatment.organic_solutions);
                    }
                    if !treatment.inorganic_solutions.is_empty() {
                        println!("  Inorganic: {}", treatment.inorganic_solutions);
                    }
                }
                None => println!("\nNo treatment information for {}", top.label),
            }
        }
    }

    Ok(())
}

fn fetch_image(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent("Mozilla/5.0 (compatible; agrilens/1.0)")
        .build()?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to fetch image from {}", url))?
        .error_for_status()?;
    Ok(response.bytes()?.to_vec())
}
