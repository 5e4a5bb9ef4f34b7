//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default model or endpoint, only edit this file.

/// Default chat-completions endpoint base URL
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default language model identifier
pub const DEFAULT_MODEL_NAME: &str = "gpt-3.5-turbo";

/// Sampling temperature for narrative generation
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default number of top attributions to surface
pub const DEFAULT_TOP_N: usize = 5;

/// Default encoded dataset path
pub const DEFAULT_DATASET_PATH: &str = "data/churn_encoded.csv";

/// Default label column name in the dataset
pub const DEFAULT_LABEL_COLUMN: &str = "churned";

/// Default explanation log directory
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default report artifact directory
pub const DEFAULT_REPORT_DIR: &str = "reports";

/// Default SMTP relay host
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP port
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Seed for the train/validation split
pub const SPLIT_SEED: u64 = 42;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "churn-explainer";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get language-model API key from environment (no default)
pub fn get_api_key() -> Option<String> {
    std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())
}

/// Get endpoint base URL from environment or use default
pub fn get_api_base() -> String {
    std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE.to_string())
}

/// Get model identifier from environment or use default
pub fn get_model_name() -> String {
    std::env::var("GPT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string())
}

/// Get dataset path from environment or use default
pub fn get_dataset_path() -> String {
    std::env::var("CHURN_DATASET").unwrap_or_else(|_| DEFAULT_DATASET_PATH.to_string())
}

/// Get label column name from environment or use default
pub fn get_label_column() -> String {
    std::env::var("CHURN_LABEL_COLUMN").unwrap_or_else(|_| DEFAULT_LABEL_COLUMN.to_string())
}

/// Get top-N attribution count from environment or use default
pub fn get_top_n() -> usize {
    std::env::var("CHURN_TOP_N")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TOP_N)
}

/// Get explanation log directory from environment or use default
pub fn get_log_dir() -> String {
    std::env::var("CHURN_LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string())
}

/// Get report directory from environment or use default
pub fn get_report_dir() -> String {
    std::env::var("CHURN_REPORT_DIR").unwrap_or_else(|_| DEFAULT_REPORT_DIR.to_string())
}

/// Check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    std::env::var("CHURN_DEBUG")
        .map(|s| s.to_lowercase() == "true" || s == "1")
        .unwrap_or(false)
}
