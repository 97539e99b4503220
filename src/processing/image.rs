use crate::utils::DocumentError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, GrayImage, ImageFormat};
use imageproc::contrast::equalize_histogram;
use imageproc::filter::median_filter;
use std::io::Cursor;

pub struct ImageProcessor;

impl ImageProcessor {
    /// Decode a base64 payload, raw or as a `data:image/...;base64,` URI, into an image.
    pub fn decode_base64(payload: &str) -> Result<DynamicImage, DocumentError> {
        let encoded = Self::strip_data_uri(payload);
        let encoded: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| DocumentError::ImageDecode(format!("Invalid base64 payload: {}", e)))?;

        image::load_from_memory(&bytes)
            .map_err(|e| DocumentError::ImageDecode(format!("Failed to load image: {}", e)))
    }

    /// Everything up to the first comma is a data-URI header.
    pub fn strip_data_uri(payload: &str) -> &str {
        match payload.split_once(',') {
            Some((_, data)) => data,
            None => payload,
        }
    }

    /// Grayscale, histogram equalization for contrast, then a 3x3 median filter for noise.
    pub fn preprocess(image: &DynamicImage) -> GrayImage {
        let gray = image.to_luma8();
        if gray.width() == 0 || gray.height() == 0 {
            return gray;
        }

        let enhanced = equalize_histogram(&gray);
        median_filter(&enhanced, 1, 1)
    }

    pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>, DocumentError> {
        let mut buffer = Vec::new();
        DynamicImage::ImageLuma8(image.clone())
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| {
                DocumentError::ImageProcessing(format!("Failed to encode processed image: {}", e))
            })?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn sample_png_base64() -> String {
        let img: GrayImage = ImageBuffer::from_fn(16, 8, |x, _| Luma([(x * 16) as u8]));
        STANDARD.encode(ImageProcessor::encode_png(&img).unwrap())
    }

    #[test]
    fn test_decode_raw_base64() {
        let image = ImageProcessor::decode_base64(&sample_png_base64()).unwrap();
        assert_eq!((image.width(), image.height()), (16, 8));
    }

    #[test]
    fn test_decode_data_uri() {
        let payload = format!("data:image/png;base64,{}", sample_png_base64());
        let image = ImageProcessor::decode_base64(&payload).unwrap();
        assert_eq!(image.width(), 16);
    }

    #[test]
    fn test_decode_tolerates_line_breaks() {
        let encoded = sample_png_base64();
        let (head, tail) = encoded.split_at(10);
        let image = ImageProcessor::decode_base64(&format!("{}\n{}", head, tail)).unwrap();
        assert_eq!(image.height(), 8);
    }

    #[test]
    fn test_empty_payload_fails() {
        assert!(matches!(
            ImageProcessor::decode_base64(""),
            Err(DocumentError::ImageDecode(_))
        ));
    }

    #[test]
    fn test_non_image_payload_fails() {
        let payload = STANDARD.encode(b"definitely not an image");
        assert!(matches!(
            ImageProcessor::decode_base64(&payload),
            Err(DocumentError::ImageDecode(_))
        ));
        assert!(ImageProcessor::decode_base64("%%%").is_err());
    }

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(ImageProcessor::strip_data_uri("data:image/jpeg;base64,AAAA"), "AAAA");
        assert_eq!(ImageProcessor::strip_data_uri("AAAA"), "AAAA");
    }

    #[test]
    fn test_preprocess_keeps_dimensions() {
        let rgb = DynamicImage::new_rgb8(20, 10);
        let processed = ImageProcessor::preprocess(&rgb);
        assert_eq!(processed.dimensions(), (20, 10));
    }
}
