// Identity document validation server

use clap::Parser;
use idscan::api::{self, AppState};
use idscan::config::Config;
use idscan::processing::TesseractEngine;
use idscan::utils::DocumentError;
use idscan::DocumentValidator;
use log::{error, info};
use std::sync::Arc;

async fn run(config: Config) -> Result<(), DocumentError> {
    let rules = config.load_rules()?;
    let addr = config.socket_addr()?;

    // Loaded once, shared by every request
    let engine = TesseractEngine::new(config.tessdata.clone(), &config.ocr_languages)?;
    let validator = DocumentValidator::new(Arc::new(engine), &rules)?;

    let app = api::build_router(AppState::new(validator), &config.allowed_origins)?;
    info!("Endpoints: POST /api/validate-document-ocr, GET /api/health");

    api::serve(app, addr).await
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    if let Err(err) = run(config).await {
        error!("{}", err);
        std::process::exit(1);
    }
}
