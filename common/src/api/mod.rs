use serde_json::Value;

use crate::error::{self, ServiceError};

pub mod file;
pub mod report;

/// Pulls the backend's `detail` field out of an error body. Strings are kept
/// verbatim, other JSON values keep their JSON text.
pub fn diagnostic(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

/// Reads treat any non-success status as a failed round trip.
pub(crate) fn ensure_success(response: reqwest::Response) -> error::Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    log::warn!("{} returned {}", response.url(), status);
    Err(ServiceError::transport(anyhow::anyhow!(
        "{} returned {}",
        response.url().path(),
        status
    )))
}
