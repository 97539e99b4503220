// Print the raw OCR fragments of one image, optionally with the full validation report

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::Parser;
use idscan::processing::{ImageProcessor, OcrEngine, TesseractEngine};
use idscan::utils::DocumentError;
use idscan::DocumentValidator;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "ocr_dump", about = "Dump OCR fragments recognized in a document image")]
struct Args {
    /// Image file to read
    image: PathBuf,

    #[arg(long, default_value = "fra+eng")]
    languages: String,

    #[arg(long)]
    tessdata: Option<String>,

    /// Also run classification and extraction and print the result as JSON
    #[arg(long)]
    validate: bool,
}

fn run(args: Args) -> Result<(), DocumentError> {
    let bytes = std::fs::read(&args.image)
        .map_err(|e| DocumentError::Io(format!("Failed to read {:?}: {}", args.image, e)))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| DocumentError::ImageDecode(format!("Failed to load image: {}", e)))?;

    let engine = Arc::new(TesseractEngine::new(args.tessdata, &args.languages)?);
    let fragments = engine.recognize(&ImageProcessor::preprocess(&image))?;

    println!("--- OCR results ({} fragments) ---", fragments.len());
    for fragment in &fragments {
        println!("{} (confidence: {:.2})", fragment.text, fragment.confidence);
    }

    if args.validate {
        let validator = DocumentValidator::with_default_rules(engine)?;
        let result = validator.validate(&STANDARD.encode(&bytes));
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| DocumentError::Io(format!("Failed to render result: {}", e)))?;
        println!("{}", json);
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run(Args::parse()) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
