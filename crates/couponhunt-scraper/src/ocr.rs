//! OCR capability and detection filtering.
//!
//! Engines report EasyOCR-shaped detections: `[bounding_box, text, confidence]`.
//! Only the text and confidence survive [`filter_detection`].

use async_trait::async_trait;
use couponhunt_core::ocr::OCR_CONFIDENCE_THRESHOLD;
use couponhunt_core::OcrDetection;
use serde_json::Value;

use crate::client::PageFetcher;
use crate::error::ScraperError;

/// Text recognition over raw image bytes.
///
/// Constructed once at startup and shared across requests.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Returns raw detections for `image`, each shaped
    /// `[bounding_box, text, confidence]`.
    async fn read_text(&self, image: &[u8]) -> Result<Vec<Value>, ScraperError>;
}

/// Engine used when OCR is switched off; recognises nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledOcr;

#[async_trait]
impl OcrEngine for DisabledOcr {
    async fn read_text(&self, _image: &[u8]) -> Result<Vec<Value>, ScraperError> {
        Ok(Vec::new())
    }
}

/// Keeps a detection's text and confidence when the confidence is strictly
/// above 0.7. Wrong-shaped detections, including confidences outside
/// `[0, 1]`, are rejected, never fatal.
#[must_use]
pub fn filter_detection(detection: &Value) -> Option<OcrDetection> {
    let parts = detection.as_array()?;
    if parts.len() < 3 {
        return None;
    }
    let text = parts[1].as_str()?;
    let confidence = parts[2].as_f64().filter(|c| (0.0..=1.0).contains(c))?;
    if confidence > OCR_CONFIDENCE_THRESHOLD {
        Some(OcrDetection {
            text: text.to_owned(),
            confidence,
        })
    } else {
        None
    }
}

/// Downloads each image and runs it through `engine`, returning every
/// confident detection across all images in order.
///
/// Images the server reports as non-`image/*` are skipped, as is any image
/// whose download or recognition fails.
pub async fn extract_text_from_images(
    fetcher: &PageFetcher,
    engine: &dyn OcrEngine,
    images: &[String],
) -> Vec<OcrDetection> {
    let mut detections = Vec::new();
    let total = images.len();

    for (idx, url) in images.iter().enumerate() {
        tracing::debug!(image = idx + 1, total, url = %url, "analyzing image");
        match read_image(fetcher, engine, url).await {
            Ok(raw) => {
                let before = detections.len();
                detections.extend(raw.iter().filter_map(filter_detection));
                tracing::debug!(
                    url = %url,
                    raw = raw.len(),
                    kept = detections.len() - before,
                    "OCR complete"
                );
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "skipping image");
            }
        }
    }

    tracing::info!(
        images = total,
        segments = detections.len(),
        "image text extraction finished"
    );
    detections
}

async fn read_image(
    fetcher: &PageFetcher,
    engine: &dyn OcrEngine,
    url: &str,
) -> Result<Vec<Value>, ScraperError> {
    // Many CDNs reject HEAD; only a definite non-image answer disqualifies.
    if let Ok(Some(content_type)) = fetcher.head_content_type(url).await {
        if !content_type.starts_with("image/") {
            return Err(ScraperError::NotAnImage {
                url: url.to_owned(),
                content_type,
            });
        }
    }
    let bytes = fetcher.fetch_bytes(url).await?;
    engine.read_text(&bytes).await
}
