use crate::models::RuleSet;
use crate::utils::DocumentError;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Server settings, read from flags or `IDSCAN_*` environment variables.
#[derive(Debug, Clone, Parser)]
#[command(name = "idscan", version, about = "Identity document OCR validation service")]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "IDSCAN_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "IDSCAN_PORT", default_value_t = 5001)]
    pub port: u16,

    /// Tesseract language list, e.g. `fra+eng+ara`
    #[arg(long, env = "IDSCAN_OCR_LANGUAGES", default_value = "fra+eng")]
    pub ocr_languages: String,

    /// Tesseract data directory; the system default is used when absent
    #[arg(long, env = "IDSCAN_TESSDATA")]
    pub tessdata: Option<String>,

    /// Origins allowed to make credentialed cross-origin requests
    #[arg(
        long,
        env = "IDSCAN_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:4200,http://127.0.0.1:4200"
    )]
    pub allowed_origins: Vec<String>,

    /// JSON rule set replacing the built-in pattern tables
    #[arg(long, env = "IDSCAN_RULES")]
    pub rules: Option<PathBuf>,
}

impl Config {
    pub fn socket_addr(&self) -> Result<SocketAddr, DocumentError> {
        let ip: IpAddr = self.host.parse().map_err(|e| {
            DocumentError::Config(format!("Invalid host {:?}: {}", self.host, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn load_rules(&self) -> Result<RuleSet, DocumentError> {
        match &self.rules {
            Some(path) => RuleSet::from_json_file(path),
            None => Ok(RuleSet::default()),
        }
    }
}
