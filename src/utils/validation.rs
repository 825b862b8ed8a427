use crate::domain::model::Amount;
use crate::utils::error::{AdvisorError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> AdvisorError {
    AdvisorError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn is_remote_source(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// A catalog source is either an http(s) URL or a local file path.
pub fn validate_catalog_source(field: &str, source: &str) -> Result<()> {
    if source.trim().is_empty() {
        return Err(invalid(field, source, "Catalog source cannot be empty"));
    }

    if !is_remote_source(source) {
        if source.contains('\0') {
            return Err(invalid(field, source, "Path contains null bytes"));
        }
        return Ok(());
    }

    let url = Url::parse(source)
        .map_err(|e| invalid(field, source, format!("Invalid URL format: {}", e)))?;
    if url.host_str().is_none() {
        return Err(invalid(field, source, "URL has no host"));
    }
    Ok(())
}

/// Query limits of zero would make every selection empty.
pub fn validate_limit(field: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(invalid(field, value, "Limit must be at least 1"));
    }
    Ok(())
}

pub fn validate_percent(field: &str, value: u32) -> Result<()> {
    if value > 100 {
        return Err(invalid(field, value, "Percent must be between 0 and 100"));
    }
    Ok(())
}

pub fn validate_amount(field: &str, value: Amount) -> Result<()> {
    if value < 0 {
        return Err(invalid(field, value, "Amount cannot be negative"));
    }
    Ok(())
}
