use serde::{Deserialize, Serialize};

/// Minimum confidence (exclusive) for an OCR detection to be kept.
pub const OCR_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// A line of text recognised in an image, without its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrDetection {
    pub text: String,
    /// Engine confidence in `[0, 1]`.
    pub confidence: f64,
}
