//! Recipe photo generation and web optimization.

use std::collections::HashSet;
use std::fmt;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, ImageReader, Rgb, RgbImage};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Largest width or height kept after optimization.
pub const WEB_MAX_DIMENSION: u32 = 384;

pub const WEB_JPEG_QUALITY: u8 = 75;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image generation failed: {0}")]
    GenerationFailed(String),

    #[error("Failed to process image: {0}")]
    Processing(String),
}

/// Image-generation capability.
#[async_trait]
pub trait ImageGenerator: Send + Sync + fmt::Debug {
    /// Generate an image for `prompt`, returning encoded bytes (PNG or JPEG).
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError>;

    fn model_name(&self) -> &str;
}

/// Shrink an image to fit `WEB_MAX_DIMENSION` square and re-encode as JPEG.
pub fn optimize_for_web(data: &[u8]) -> Result<Vec<u8>, ImageError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::Processing(format!("Failed to read image: {}", e)))?;
    if reader.format().is_none() {
        return Err(ImageError::Processing(
            "Could not detect image format".to_string(),
        ));
    }

    let mut img = reader
        .decode()
        .map_err(|e| ImageError::Processing(format!("Failed to decode image: {}", e)))?;
    if img.width() > WEB_MAX_DIMENSION || img.height() > WEB_MAX_DIMENSION {
        img = img.thumbnail(WEB_MAX_DIMENSION, WEB_MAX_DIMENSION);
    }

    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, WEB_JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| ImageError::Processing(format!("Failed to encode JPEG: {}", e)))?;
    Ok(out)
}

/// Offline image generator producing a solid-color PNG derived from the prompt.
#[derive(Debug)]
pub struct FakeImageGenerator {
    size: u32,
    failing_prompts: HashSet<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl Default for FakeImageGenerator {
    fn default() -> Self {
        Self {
            size: 512,
            failing_prompts: HashSet::new(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl FakeImageGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Side length of generated images.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size.max(1);
        self
    }

    /// Fail any prompt containing `fragment`.
    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.failing_prompts.insert(fragment.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for FakeImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_prompts.iter().any(|f| prompt.contains(f.as_str())) {
            return Err(ImageError::GenerationFailed(
                "FakeImageGenerator: prompt configured to fail".to_string(),
            ));
        }

        let digest = Sha256::digest(prompt.as_bytes());
        let img = RgbImage::from_pixel(self.size, self.size, Rgb([digest[0], digest[1], digest[2]]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| ImageError::GenerationFailed(e.to_string()))?;
        Ok(buf.into_inner())
    }

    fn model_name(&self) -> &str {
        "fake-image"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[tokio::test]
    async fn test_fake_generator_produces_png() {
        let generator = FakeImageGenerator::new().with_size(16);
        let bytes = generator.generate("Professional food photography").await.unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.dimensions(), (16, 16));
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fake_generator_failure() {
        let generator = FakeImageGenerator::new().failing_on("Salad");
        assert!(generator.generate("A Green Salad").await.is_err());
        assert!(generator.generate("A Stew").await.is_ok());
    }

    #[tokio::test]
    async fn test_optimize_shrinks_and_reencodes() {
        let png = FakeImageGenerator::new()
            .with_size(1024)
            .generate("big")
            .await
            .unwrap();
        let optimized = optimize_for_web(&png).unwrap();

        assert_eq!(image::guess_format(&optimized).unwrap(), ImageFormat::Jpeg);
        let img = image::load_from_memory(&optimized).unwrap();
        assert!(img.width() <= WEB_MAX_DIMENSION && img.height() <= WEB_MAX_DIMENSION);
    }

    #[tokio::test]
    async fn test_optimize_keeps_small_dimensions() {
        let png = FakeImageGenerator::new()
            .with_size(100)
            .generate("small")
            .await
            .unwrap();
        let img = image::load_from_memory(&optimize_for_web(&png).unwrap()).unwrap();
        assert_eq!(img.dimensions(), (100, 100));
    }

    #[test]
    fn test_optimize_rejects_garbage() {
        assert!(optimize_for_web(b"not an image").is_err());
    }
}
