use std::{env::var, time::Duration};

use lazy_static::lazy_static;

pub const DEFAULT_API_BASE: &str = "http://localhost:8023";
pub const API_PREFIX: &str = "api";

lazy_static! {
    pub static ref API_BASE: String = api_base(var("API_BASE").ok());
    pub static ref REQUEST_TIMEOUT: Option<Duration> =
        request_timeout(var("API_TIMEOUT_SECS").ok());
}

/// A blank value counts as unset.
pub fn api_base(value: Option<String>) -> String {
    value
        .filter(|base| !base.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// Seconds before a request is abandoned. `0` and unset both mean no timeout.
pub fn request_timeout(value: Option<String>) -> Option<Duration> {
    let value = value?;
    match value.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(err) => {
            log::warn!("Ignoring API_TIMEOUT_SECS={:?}: {}", value, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_base_falls_back_to_default() {
        assert_eq!(api_base(None), DEFAULT_API_BASE);
        assert_eq!(api_base(Some(String::new())), DEFAULT_API_BASE);
        assert_eq!(api_base(Some("  ".to_string())), DEFAULT_API_BASE);
    }

    #[test]
    fn configured_base_is_kept() {
        assert_eq!(
            api_base(Some("http://reports.local:9000".to_string())),
            "http://reports.local:9000"
        );
    }

    #[test]
    fn timeout_is_whole_seconds() {
        assert_eq!(request_timeout(Some("30".to_string())), Some(Duration::from_secs(30)));
        assert_eq!(request_timeout(Some(" 5 ".to_string())), Some(Duration::from_secs(5)));
    }

    #[test]
    fn zero_or_bad_timeout_means_none() {
        assert_eq!(request_timeout(None), None);
        assert_eq!(request_timeout(Some("0".to_string())), None);
        assert_eq!(request_timeout(Some("ten".to_string())), None);
        assert_eq!(request_timeout(Some("-1".to_string())), None);
    }
}
