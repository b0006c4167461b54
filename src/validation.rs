use crate::errors::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_valid_email(input: &str) -> bool {
    EMAIL_RE.is_match(input)
}

/// Local, synchronous check; never issues a remote call.
pub fn validate_email(input: &str) -> AppResult<()> {
    if is_valid_email(input) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Please enter a valid email address".to_string(),
        ))
    }
}
