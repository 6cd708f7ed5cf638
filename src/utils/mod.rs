//! Shared utilities: HTTP client construction, retry logic, input validation.

pub mod http;
pub mod retry;
pub mod validate;

pub use http::HttpClient;
pub use retry::{api_retry_config, with_retry, RetryConfig, TransientError};
pub use validate::{clamp_result_count, validate_locale_code, validate_url, ValidationError};
