use crate::models::OcrFragment;
use crate::utils::DocumentError;
use image::GrayImage;
use log::warn;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Text recognition capability used by the validator.
///
/// Implementations are shared between request threads, so they must be `Send + Sync`.
/// An `OcrEngine` error means this image could not be read; `OcrUnavailable` means the
/// engine itself is unusable.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Recognized fragments in reading order; an empty list is a valid answer.
    fn recognize(&self, image: &GrayImage) -> Result<Vec<OcrFragment>, DocumentError>;
}

/// Groups word rows (level 5) of Tesseract TSV output into one fragment per text line,
/// with the mean word confidence scaled to [0, 1].
pub fn parse_tsv_fragments(tsv: &str) -> Vec<OcrFragment> {
    let mut lines: BTreeMap<(i32, i32, i32, i32), Vec<(String, f32)>> = BTreeMap::new();

    for row in tsv.lines() {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        // Header rows and non-word levels fall out here
        if cols[0].trim().parse::<i32>().ok() != Some(5) {
            continue;
        }
        let conf: f32 = cols[10].trim().parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (
            cols[1].trim().parse().unwrap_or(0),
            cols[2].trim().parse().unwrap_or(0),
            cols[3].trim().parse().unwrap_or(0),
            cols[4].trim().parse().unwrap_or(0),
        );
        lines.entry(key).or_default().push((text.to_string(), conf));
    }

    lines
        .into_values()
        .map(|words| {
            let confidence = words.iter().map(|(_, conf)| conf).sum::<f32>() / words.len() as f32;
            let text = words
                .into_iter()
                .map(|(word, _)| word)
                .collect::<Vec<_>>()
                .join(" ");
            OcrFragment::new(text, confidence / 100.0)
        })
        .collect()
}

/// Locks an engine slot. A panic during an earlier call poisons the lock with the slot in an
/// unknown state; it is emptied so the caller builds a fresh engine.
#[cfg_attr(not(feature = "tesseract"), allow(dead_code))]
pub(crate) fn lock_engine_slot<T>(slot: &Mutex<Option<T>>) -> MutexGuard<'_, Option<T>> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("OCR engine lock poisoned by a panicked call, discarding the engine");
            slot.clear_poison();
            let mut guard = poisoned.into_inner();
            *guard = None;
            guard
        }
    }
}

#[cfg(feature = "tesseract")]
pub use self::tesseract_engine::TesseractEngine;

#[cfg(feature = "tesseract")]
mod tesseract_engine {
    use super::{lock_engine_slot, parse_tsv_fragments, OcrEngine};
    use crate::models::OcrFragment;
    use crate::processing::ImageProcessor;
    use crate::utils::DocumentError;
    use image::GrayImage;
    use log::{debug, info, warn};
    use std::sync::Mutex;
    use tesseract::Tesseract;

    /// Tesseract-backed engine, initialized once and shared by all requests.
    ///
    /// Recognition is serialized on one handle. A failed call consumes the handle; the next
    /// call initializes a fresh one.
    pub struct TesseractEngine {
        datapath: Option<String>,
        languages: String,
        handle: Mutex<Option<Tesseract>>,
    }

    impl TesseractEngine {
        pub fn new(datapath: Option<String>, languages: &str) -> Result<Self, DocumentError> {
            let tesseract = Self::initialize(datapath.as_deref(), languages)?;
            info!("Tesseract initialized with languages {}", languages);

            Ok(TesseractEngine {
                datapath,
                languages: languages.to_string(),
                handle: Mutex::new(Some(tesseract)),
            })
        }

        pub fn languages(&self) -> &str {
            &self.languages
        }

        fn initialize(datapath: Option<&str>, languages: &str) -> Result<Tesseract, DocumentError> {
            Tesseract::new(datapath, Some(languages)).map_err(|e| {
                DocumentError::OcrUnavailable(format!(
                    "Tesseract init error for {}: {}",
                    languages, e
                ))
            })
        }
    }

    impl OcrEngine for TesseractEngine {
        fn name(&self) -> &str {
            "tesseract"
        }

        fn recognize(&self, image: &GrayImage) -> Result<Vec<OcrFragment>, DocumentError> {
            let png = ImageProcessor::encode_png(image)?;

            let mut slot = lock_engine_slot(&self.handle);
            let tesseract = match slot.take() {
                Some(tesseract) => tesseract,
                None => {
                    warn!("Re-initializing Tesseract after a failed recognition");
                    Self::initialize(self.datapath.as_deref(), &self.languages)?
                }
            };

            let mut tesseract = tesseract
                .set_image_from_mem(&png)
                .map_err(|e| DocumentError::OcrEngine(format!("Tesseract set image error: {}", e)))?
                .recognize()
                .map_err(|e| DocumentError::OcrEngine(format!("Tesseract recognize error: {}", e)))?;
            let tsv = tesseract
                .get_tsv_text(0)
                .map_err(|e| DocumentError::OcrEngine(format!("Tesseract TSV error: {}", e)))?;
            *slot = Some(tesseract);

            let fragments = parse_tsv_fragments(&tsv);
            debug!("Tesseract returned {} fragments", fragments.len());
            Ok(fragments)
        }
    }
}
