//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `ALLOWED_API_KEYS` — comma-separated credential allow-list
/// - `ORDERS_TABLE` — DynamoDB table name; unset selects the in-memory store
/// - `AWS_ENDPOINT_URL` — store endpoint override for local tables
/// - `COMPLETION_ENDPOINT` / `COMPLETION_API_KEY` / `COMPLETION_MODEL` —
///   completion-service connection
/// - `OCR_LANGUAGE` — OCR language profile (default: `"eng"`)
/// - `TESSERACT_BIN` — OCR binary (default: `"tesseract"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub allowed_api_keys: String,
    pub orders_table: Option<String>,
    pub aws_endpoint_url: Option<String>,
    pub completion_endpoint: String,
    pub completion_api_key: Option<String>,
    pub completion_model: String,
    pub ocr_language: String,
    pub tesseract_bin: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            allowed_api_keys: std::env::var("ALLOWED_API_KEYS")
                .unwrap_or(defaults.allowed_api_keys),
            orders_table: std::env::var("ORDERS_TABLE").ok(),
            aws_endpoint_url: std::env::var("AWS_ENDPOINT_URL").ok(),
            completion_endpoint: std::env::var("COMPLETION_ENDPOINT")
                .unwrap_or(defaults.completion_endpoint),
            completion_api_key: std::env::var("COMPLETION_API_KEY").ok(),
            completion_model: std::env::var("COMPLETION_MODEL")
                .unwrap_or(defaults.completion_model),
            ocr_language: std::env::var("OCR_LANGUAGE").unwrap_or(defaults.ocr_language),
            tesseract_bin: std::env::var("TESSERACT_BIN").unwrap_or(defaults.tesseract_bin),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_api_keys: String::new(),
            orders_table: None,
            aws_endpoint_url: None,
            completion_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            completion_api_key: None,
            completion_model: "gpt-4o-mini".to_string(),
            ocr_language: "eng".to_string(),
            tesseract_bin: "tesseract".to_string(),
        }
    }
}
