/// Name reported in every response envelope
pub fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

/// Masking character used when replacing sensitive words
pub const MASK_CHAR: char = '*';
