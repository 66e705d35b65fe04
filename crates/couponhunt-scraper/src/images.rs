//! Image discovery for OCR.
//!
//! Collects candidate banner/promo image URLs from a page, resolving relative
//! sources against the page host and dropping inline and icon-sized images.

use std::sync::LazyLock;

use scraper::node::Element;
use scraper::{Html, Selector};

use crate::client::{extract_base_host, PageFetcher};

/// Upper bound on `img` elements examined per page.
pub const MAX_IMAGE_CANDIDATES: usize = 250;
pub const MIN_IMAGE_WIDTH: i64 = 200;
pub const MIN_IMAGE_HEIGHT: i64 = 200;

/// Source attributes in priority order; lazy-loading libraries park the real
/// URL in `data-*` attributes and leave `src` empty.
const SOURCE_ATTRIBUTES: [&str; 3] = ["src", "data-src", "data-lazy-src"];

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid img selector"));

/// Resolves an `img` element to an absolute image URL, or `None` when the
/// element should be skipped.
///
/// Skips elements with no usable source, inline `data:` images, and images
/// whose declared width or height is below 200px. Undeclared or non-numeric
/// dimensions pass.
#[must_use]
pub fn select_image_url(img: &Element, base_host: &str) -> Option<String> {
    let raw = SOURCE_ATTRIBUTES
        .iter()
        .find_map(|attr| img.attr(attr).filter(|v| !v.is_empty()))?;
    let src = raw.trim();
    if src.is_empty() || src.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:")) {
        return None;
    }

    let url = if src.starts_with("//") {
        format!("https:{src}")
    } else if src.starts_with('/') {
        format!("https://{base_host}{src}")
    } else if src.starts_with("http://") || src.starts_with("https://") {
        src.to_owned()
    } else {
        format!("https://{base_host}/{src}")
    };

    if is_below_minimum_size(img) {
        return None;
    }

    Some(url)
}

fn is_below_minimum_size(img: &Element) -> bool {
    let width = dimension(img, "width", "data-width");
    let height = dimension(img, "height", "data-height");
    let (Some(width), Some(height)) = (width, height) else {
        return false;
    };
    match (width.parse::<i64>(), height.parse::<i64>()) {
        (Ok(w), Ok(h)) => w < MIN_IMAGE_WIDTH || h < MIN_IMAGE_HEIGHT,
        _ => false,
    }
}

/// Reads a declared dimension, preferring `primary` over `fallback` and
/// dropping a trailing `px` unit.
fn dimension<'a>(img: &'a Element, primary: &str, fallback: &str) -> Option<&'a str> {
    [primary, fallback].iter().find_map(|attr| {
        img.attr(attr)
            .map(|v| v.trim().trim_end_matches("px").trim())
            .filter(|v| !v.is_empty())
    })
}

/// Extracts up to [`MAX_IMAGE_CANDIDATES`] image URLs from `html`, resolved
/// against the host of `page_url`, de-duplicated in document order.
#[must_use]
pub fn extract_image_urls(html: &str, page_url: &str) -> Vec<String> {
    let Some(base_host) = extract_base_host(page_url) else {
        tracing::warn!(page_url, "could not determine base host; skipping image scan");
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut images: Vec<String> = Vec::new();
    let mut examined = 0usize;

    for img in document.select(&IMG_SELECTOR).take(MAX_IMAGE_CANDIDATES) {
        examined += 1;
        if let Some(url) = select_image_url(img.value(), &base_host) {
            if !images.contains(&url) {
                images.push(url);
            }
        }
    }

    tracing::debug!(page_url, examined, kept = images.len(), "image scan complete");
    images
}

/// Fetches `page_url` and returns the candidate image URLs on it.
///
/// A failed fetch is logged and yields an empty list.
pub async fn scrape_images(fetcher: &PageFetcher, page_url: &str) -> Vec<String> {
    match fetcher.fetch_html(page_url).await {
        Ok(html) => extract_image_urls(&html, page_url),
        Err(e) => {
            tracing::warn!(page_url, error = %e, "page fetch failed; no images scraped");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(html: &str, base: &str) -> Option<String> {
        let doc = Html::parse_fragment(html);
        let img = doc.select(&IMG_SELECTOR).next().expect("img present");
        select_image_url(img.value(), base)
    }

    #[test]
    fn resolves_protocol_relative_source() {
        let got = select(
            r#"<img src="//cdn.example.com/a.png" width="300" height="300">"#,
            "shop.com",
        );
        assert_eq!(got.as_deref(), Some("https://cdn.example.com/a.png"));
    }

    #[test]
    fn rejects_small_declared_dimensions() {
        let got = select(
            r#"<img src="//cdn.example.com/a.png" width="50" height="50">"#,
            "shop.com",
        );
        assert_eq!(got, None);
    }

    #[test]
    fn rejects_data_uri_regardless_of_size() {
        let got = select(
            r#"<img src="data:image/png;base64,iVBORw0KGgo=" width="800" height="600">"#,
            "shop.com",
        );
        assert_eq!(got, None);
    }

    #[test]
    fn resolves_root_and_path_relative_sources() {
        assert_eq!(
            select(r#"<img src="/img/banner.jpg">"#, "shop.com").as_deref(),
            Some("https://shop.com/img/banner.jpg")
        );
        assert_eq!(
            select(r#"<img src="img/banner.jpg">"#, "shop.com").as_deref(),
            Some("https://shop.com/img/banner.jpg")
        );
        assert_eq!(
            select(r#"<img src="http://other.com/x.gif">"#, "shop.com").as_deref(),
            Some("http://other.com/x.gif")
        );
    }

    #[test]
    fn falls_back_to_lazy_load_attributes() {
        assert_eq!(
            select(r#"<img src="" data-src="/lazy.png">"#, "shop.com").as_deref(),
            Some("https://shop.com/lazy.png")
        );
        assert_eq!(
            select(r#"<img data-lazy-src="/later.png">"#, "shop.com").as_deref(),
            Some("https://shop.com/later.png")
        );
    }

    #[test]
    fn rejects_missing_or_blank_source() {
        assert_eq!(select(r"<img alt='nothing'>", "shop.com"), None);
        assert_eq!(select(r#"<img src="   ">"#, "shop.com"), None);
    }

    #[test]
    fn strips_px_units_and_reads_data_dimensions() {
        assert_eq!(
            select(r#"<img src="/a.png" width="150px" height="400px">"#, "shop.com"),
            None
        );
        assert_eq!(
            select(
                r#"<img src="/a.png" data-width="100" data-height="100">"#,
                "shop.com"
            ),
            None
        );
        assert!(select(r#"<img src="/a.png" width="250px" height="250px">"#, "shop.com").is_some());
    }

    #[test]
    fn missing_or_non_numeric_dimensions_pass() {
        assert!(select(r#"<img src="/a.png" width="100">"#, "shop.com").is_some());
        assert!(select(r#"<img src="/a.png" width="auto" height="10">"#, "shop.com").is_some());
    }

    #[test]
    fn extract_image_urls_dedupes_and_resolves_against_page_host() {
        let html = r#"
            <html><body>
              <img src="/hero.png">
              <img src="/hero.png">
              <img src="data:image/gif;base64,R0lGOD">
              <img src="//cdn.shop.com/promo.jpg" width="600" height="300">
              <img src="/icon.png" width="16" height="16">
            </body></html>
        "#;
        let urls = extract_image_urls(html, "https://shop.com/deals");
        assert_eq!(
            urls,
            vec![
                "https://shop.com/hero.png".to_string(),
                "https://cdn.shop.com/promo.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn extract_image_urls_caps_examined_elements() {
        let mut html = String::from("<html><body>");
        for i in 0..300 {
            html.push_str(&format!(r#"<img src="/img/{i}.png">"#));
        }
        html.push_str("</body></html>");
        let urls = extract_image_urls(&html, "https://shop.com");
        assert_eq!(urls.len(), MAX_IMAGE_CANDIDATES);
        assert_eq!(urls.last().map(String::as_str), Some("https://shop.com/img/249.png"));
    }

    #[test]
    fn extract_image_urls_needs_a_base_host() {
        assert!(extract_image_urls(r#"<img src="/a.png">"#, "not a url").is_empty());
    }
}
