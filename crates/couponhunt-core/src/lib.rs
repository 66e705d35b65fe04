pub mod app_config;
pub mod config;
pub mod coupons;
pub mod forms;
pub mod ocr;
pub mod request;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use coupons::{
    dedupe_by_code, validate_coupon_code, AnalyzeResponse, CouponCode, CouponCodeList,
};
pub use forms::{FormAnalyzeRequest, FormAnalyzeResponse, FormField, FormFields};
pub use ocr::OcrDetection;
pub use request::{normalize_url, AnalyzeRequest};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
