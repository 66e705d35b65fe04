//! Tools exposed to the model through OpenAI function calling.
//!
//! Each tool takes its arguments as a JSON string, runs one coupon-finding
//! step, and returns its result as a JSON string for the next model turn.

use std::sync::Arc;

use async_trait::async_trait;
use couponhunt_scraper::{
    clean_html, extract_text_from_images, scrape_images, CouponSiteProber, OcrEngine, PageFetcher,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::extract::{extract_coupons_from_text, extract_form_fields};
use crate::llm::ChatClient;

/// A function the model can call.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;

    /// Runs the tool on raw JSON `arguments` and returns JSON text.
    async fn call(&self, arguments: &str) -> Result<String, ToolError>;

    /// The tool in chat completions `tools` format.
    fn definition(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description(),
                "parameters": self.parameters(),
            }
        })
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    /// Parses one entry of an assistant message's `tool_calls`.
    #[must_use]
    pub fn from_openai_value(value: &Value) -> Option<Self> {
        let function = value.get("function")?;
        let arguments = match function.get("arguments")? {
            Value::String(text) => text.clone(),
            object @ Value::Object(_) => object.to_string(),
            _ => return None,
        };
        Some(Self {
            id: value.get("id")?.as_str()?.to_owned(),
            name: function.get("name")?.as_str()?.to_owned(),
            arguments,
        })
    }
}

fn parse_args<T: DeserializeOwned>(arguments: &str) -> Result<T, ToolError> {
    serde_json::from_str(arguments).map_err(|e| ToolError::ArgumentParse(e.to_string()))
}

fn to_output<T: Serialize + ?Sized>(value: &T) -> Result<String, ToolError> {
    serde_json::to_string(value).map_err(|e| ToolError::Execution(e.to_string()))
}

/// The full coupon-finding tool set, in the order presented to the model.
#[must_use]
pub fn coupon_tools(
    fetcher: PageFetcher,
    ocr: Arc<dyn OcrEngine>,
    llm: ChatClient,
    prober: CouponSiteProber,
) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(ScrapeImagesTool {
            fetcher: fetcher.clone(),
        }),
        Box::new(ExtractTextFromImagesTool { fetcher, ocr }),
        Box::new(ExtractCouponsFromTextTool { llm: llm.clone() }),
        Box::new(ExtractFormFieldsTool { llm }),
        Box::new(SearchCouponsFromWebTool { prober }),
        Box::new(CleanHtmlTool),
    ]
}

pub struct ScrapeImagesTool {
    fetcher: PageFetcher,
}

#[derive(Deserialize)]
struct ScrapeImagesArgs {
    url: String,
}

#[async_trait]
impl Tool for ScrapeImagesTool {
    fn name(&self) -> &'static str {
        "scrape_some_images_from_website"
    }

    fn description(&self) -> &'static str {
        "Scrape a website and return a list(array) of the image URLs found on the page."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {"type": "string", "description": "The page URL to scrape for images"}
            },
            "required": ["url"]
        })
    }

    async fn call(&self, arguments: &str) -> Result<String, ToolError> {
        let args: ScrapeImagesArgs = parse_args(arguments)?;
        to_output(&scrape_images(&self.fetcher, &args.url).await)
    }
}

pub struct ExtractTextFromImagesTool {
    fetcher: PageFetcher,
    ocr: Arc<dyn OcrEngine>,
}

#[derive(Deserialize)]
struct ExtractTextArgs {
    images: Vec<String>,
}

#[async_trait]
impl Tool for ExtractTextFromImagesTool {
    fn name(&self) -> &'static str {
        "extract_text_from_images"
    }

    fn description(&self) -> &'static str {
        "Extract text from images using OCR. Returns a list of {text, confidence} objects."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "images": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Image URLs to read text from"
                }
            },
            "required": ["images"]
        })
    }

    async fn call(&self, arguments: &str) -> Result<String, ToolError> {
        let args: ExtractTextArgs = parse_args(arguments)?;
        let detections =
            extract_text_from_images(&self.fetcher, self.ocr.as_ref(), &args.images).await;
        to_output(&detections)
    }
}

pub struct ExtractCouponsFromTextTool {
    llm: ChatClient,
}

#[derive(Deserialize)]
struct ExtractCouponsArgs {
    extracted_texts: Vec<Value>,
}

#[async_trait]
impl Tool for ExtractCouponsFromTextTool {
    fn name(&self) -> &'static str {
        "extract_coupons_from_text"
    }

    fn description(&self) -> &'static str {
        "Given a list of objects including extracted texts, extract coupon codes (like SAVE10). \
         Returns a list(array) of {code, source} objects."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "extracted_texts": {
                    "type": "array",
                    "items": {},
                    "description": "Extracted text objects to analyze for coupon codes"
                }
            },
            "required": ["extracted_texts"]
        })
    }

    async fn call(&self, arguments: &str) -> Result<String, ToolError> {
        let args: ExtractCouponsArgs = parse_args(arguments)?;
        to_output(&extract_coupons_from_text(&self.llm, &args.extracted_texts).await)
    }
}

pub struct ExtractFormFieldsTool {
    llm: ChatClient,
}

#[derive(Deserialize)]
struct ExtractFormFieldsArgs {
    html: String,
}

#[async_trait]
impl Tool for ExtractFormFieldsTool {
    fn name(&self) -> &'static str {
        "extract_form_fields"
    }

    fn description(&self) -> &'static str {
        "Analyze HTML to find the coupon input field and the apply button. \
         Returns JSON with the CSS paths of the found elements."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "html": {"type": "string", "description": "The HTML to analyze"}
            },
            "required": ["html"]
        })
    }

    async fn call(&self, arguments: &str) -> Result<String, ToolError> {
        let args: ExtractFormFieldsArgs = parse_args(arguments)?;
        to_output(&extract_form_fields(&self.llm, &args.html).await)
    }
}

pub struct SearchCouponsFromWebTool {
    prober: CouponSiteProber,
}

#[derive(Deserialize)]
struct SearchCouponsArgs {
    merchant_name: String,
}

#[async_trait]
impl Tool for SearchCouponsFromWebTool {
    fn name(&self) -> &'static str {
        "search_coupons_from_web"
    }

    fn description(&self) -> &'static str {
        "Search well-known coupon websites for a merchant. \
         Returns a JSON array of {code, source} objects."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "merchant_name": {
                    "type": "string",
                    "description": "Merchant name without spaces or special characters; \
                                    for https://www.amazon.com/ use amazon"
                }
            },
            "required": ["merchant_name"]
        })
    }

    async fn call(&self, arguments: &str) -> Result<String, ToolError> {
        let args: SearchCouponsArgs = parse_args(arguments)?;
        to_output(&self.prober.probe(&args.merchant_name).await)
    }
}

pub struct CleanHtmlTool;

#[derive(Deserialize)]
struct CleanHtmlArgs {
    html: String,
    tags_to_remove: Vec<String>,
}

#[async_trait]
impl Tool for CleanHtmlTool {
    fn name(&self) -> &'static str {
        "clean_html"
    }

    fn description(&self) -> &'static str {
        "Clean HTML by removing the given tags (e.g. style, script, svg) and everything inside \
         them. Returns the cleaned HTML string."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "html": {"type": "string", "description": "The HTML to clean"},
                "tags_to_remove": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Tag names to remove, e.g. [\"style\", \"script\", \"svg\"]"
                }
            },
            "required": ["html", "tags_to_remove"]
        })
    }

    async fn call(&self, arguments: &str) -> Result<String, ToolError> {
        let args: CleanHtmlArgs = parse_args(arguments)?;
        Ok(clean_html(&args.html, &args.tags_to_remove))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_parsing() {
        let value = json!({
            "id": "call_123",
            "type": "function",
            "function": {"name": "clean_html", "arguments": "{\"html\": \"<p>x</p>\"}"}
        });
        let call = ToolCall::from_openai_value(&value).unwrap();
        assert_eq!(call.id, "call_123");
        assert_eq!(call.name, "clean_html");
        assert_eq!(call.arguments, "{\"html\": \"<p>x</p>\"}");
    }

    #[test]
    fn tool_call_parsing_accepts_object_arguments() {
        let value = json!({
            "id": "call_9",
            "type": "function",
            "function": {"name": "clean_html", "arguments": {"html": "<p>x</p>"}}
        });
        let call = ToolCall::from_openai_value(&value).unwrap();
        assert_eq!(call.arguments, r#"{"html":"<p>x</p>"}"#);
    }

    #[test]
    fn tool_call_parsing_rejects_missing_fields() {
        assert_eq!(ToolCall::from_openai_value(&json!({"id": "call_1"})), None);
        assert_eq!(
            ToolCall::from_openai_value(&json!({"function": {"name": "x", "arguments": "{}"}})),
            None
        );
    }

    #[test]
    fn definition_uses_function_format() {
        let def = CleanHtmlTool.definition();
        assert_eq!(def["type"], "function");
        assert_eq!(def["function"]["name"], "clean_html");
        assert_eq!(def["function"]["parameters"]["required"][1], "tags_to_remove");
    }

    #[tokio::test]
    async fn clean_html_tool_returns_markup() {
        let out = CleanHtmlTool
            .call(r#"{"html": "<div><style>p{}</style><p>ok</p></div>", "tags_to_remove": ["style"]}"#)
            .await
            .unwrap();
        assert_eq!(out, "<div><p>ok</p></div>");
    }

    #[tokio::test]
    async fn bad_arguments_are_reported() {
        let err = CleanHtmlTool.call(r#"{"html": 3}"#).await.unwrap_err();
        assert!(matches!(err, ToolError::ArgumentParse(_)));
    }

    #[test]
    fn tool_set_names_are_unique_and_complete() {
        let fetcher = PageFetcher::new("test", 1, 1).unwrap();
        let llm = ChatClient::new("key", "http://127.0.0.1:9", "model").unwrap();
        let prober = CouponSiteProber::new(fetcher.clone(), 1);
        let tools = coupon_tools(
            fetcher,
            Arc::new(couponhunt_scraper::DisabledOcr),
            llm,
            prober,
        );
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "scrape_some_images_from_website",
                "extract_text_from_images",
                "extract_coupons_from_text",
                "extract_form_fields",
                "search_coupons_from_web",
                "clean_html",
            ]
        );
    }
}
