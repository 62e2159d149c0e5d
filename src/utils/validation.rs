use crate::utils::error::{GenError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> GenError {
    GenError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// The API root that `/models/{model}:generateContent` is appended to.
pub fn validate_api_base_url(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "API base URL is not set"));
    }

    let url = Url::parse(value)
        .map_err(|e| invalid(field, value, format!("API base URL does not parse: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            value,
            format!("API base URL must use http or https, not {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, value, "API base URL has no host"));
    }
    // 端點路徑直接接在後面，查詢字串或片段會讓路徑失效
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            field,
            value,
            "API base URL must not carry a query string or fragment",
        ));
    }
    Ok(())
}

/// Directory the Markdown export is written into. It may not exist yet.
pub fn validate_output_dir(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "output directory is blank"));
    }
    if value.contains('\0') {
        return Err(invalid(field, value, "output directory contains a NUL byte"));
    }
    if Path::new(value).is_file() {
        return Err(invalid(field, value, "output directory points at a file"));
    }
    Ok(())
}

pub fn validate_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "must not be blank"));
    }
    Ok(())
}

pub fn validate_within<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(field, value, format!("expected {}..={}", min, max)));
    }
    Ok(())
}

/// Target length of the generated post, as sent in the content prompt.
pub fn validate_word_range(min_words: u32, max_words: u32) -> Result<()> {
    if min_words == 0 {
        return Err(invalid("generation.min_words", min_words, "must be at least 1"));
    }
    if min_words > max_words {
        return Err(invalid(
            "generation.min_words",
            min_words,
            format!("exceeds generation.max_words ({})", max_words),
        ));
    }
    Ok(())
}
