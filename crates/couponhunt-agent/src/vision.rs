//! OCR through a vision-capable chat model.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use couponhunt_scraper::{OcrEngine, ScraperError};
use serde_json::{json, Value};

use crate::llm::ChatClient;
use crate::prompts::VISION_OCR_PROMPT;

/// [`OcrEngine`] that sends each image inline to the chat model and asks for
/// `[bbox, text, confidence]` detections back.
#[derive(Debug, Clone)]
pub struct VisionOcr {
    llm: ChatClient,
}

impl VisionOcr {
    #[must_use]
    pub fn new(llm: ChatClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl OcrEngine for VisionOcr {
    async fn read_text(&self, image: &[u8]) -> Result<Vec<Value>, ScraperError> {
        let data_url = format!("data:{};base64,{}", sniff_mime(image), STANDARD.encode(image));
        let messages = vec![json!({
            "role": "user",
            "content": [
                {"type": "text", "text": VISION_OCR_PROMPT},
                {"type": "image_url", "image_url": {"url": data_url}}
            ]
        })];

        let reply = self
            .llm
            .complete_json(messages)
            .await
            .map_err(|e| ScraperError::Ocr(e.to_string()))?;

        match reply.get("detections") {
            Some(Value::Array(detections)) => Ok(detections.clone()),
            _ => Err(ScraperError::Ocr("reply has no detections list".into())),
        }
    }
}

/// Guesses the image type from its magic bytes; JPEG when unknown.
fn sniff_mime(image: &[u8]) -> &'static str {
    if image.starts_with(b"\x89PNG") {
        "image/png"
    } else if image.starts_with(b"GIF8") {
        "image/gif"
    } else if image.len() >= 12 && &image[..4] == b"RIFF" && &image[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}
