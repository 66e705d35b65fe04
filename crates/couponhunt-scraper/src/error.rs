use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("not an image ({content_type}): {url}")]
    NotAnImage { url: String, content_type: String },

    #[error("OCR engine error: {0}")]
    Ocr(String),
}
