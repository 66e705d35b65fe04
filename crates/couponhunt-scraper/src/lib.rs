pub mod client;
pub mod error;
pub mod images;
pub mod ocr;
pub mod probe;
pub mod sanitize;

pub use client::{extract_base_host, PageFetcher};
pub use error::ScraperError;
pub use images::{extract_image_urls, scrape_images, select_image_url};
pub use ocr::{extract_text_from_images, filter_detection, DisabledOcr, OcrEngine};
pub use probe::{CouponSiteProber, ProbeOutcome};
pub use sanitize::clean_html;
