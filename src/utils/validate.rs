//! Input validation for tool arguments before they reach the upstream API.

use thiserror::Error;

/// Validation error types
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid locale code: {0}")]
    InvalidLocale(String),
}

/// Validate a URL destined for the scrape, webpage, or lens endpoints.
///
/// Returns the trimmed URL if valid.
pub fn validate_url(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::InvalidUrl("empty URL".to_string()));
    }

    if url.contains('\0') {
        return Err(ValidationError::InvalidUrl(
            "contains null byte".to_string(),
        ));
    }

    let parsed = url::Url::parse(url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ValidationError::InvalidUrl(format!(
                "unsupported scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host_str().is_none() {
        return Err(ValidationError::InvalidUrl("missing host".to_string()));
    }

    Ok(url.to_string())
}

/// Validate a `gl`/`hl` style locale code.
///
/// Serper accepts codes like `us`, `en`, `pt-br`; this only rejects values
/// that are clearly not locale codes rather than enumerating valid ones.
pub fn validate_locale_code(code: &str) -> Result<String, ValidationError> {
    let code = code.trim();

    if code.is_empty() || code.len() > 10 {
        return Err(ValidationError::InvalidLocale(code.to_string()));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidLocale(code.to_string()));
    }

    Ok(code.to_ascii_lowercase())
}

/// Clamp a requested result count into the range Serper accepts.
pub fn clamp_result_count(num: i64) -> u32 {
    num.clamp(1, 100) as u32
}
