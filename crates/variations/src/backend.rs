//! Generation/variation backend contracts.
//!
//! The backends are external HTTP collaborators; this crate only fixes
//! the request/response shapes and the response-interpretation rules.
//! Errors surface the backend's `detail` message when one is present and
//! are reported to the user as visible, non-fatal messages — no
//! automatic retry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BackendError {
    #[error("{0}")]
    Rejected(String),
    #[error("backend returned no usable HTML")]
    EmptyHtml,
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

/// Reply of the sketch-to-HTML generation endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct GenerateResponse {
    pub html: String,
}

/// Body posted to the variation endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariationRequest {
    pub element_html: String,
    pub element_type: String,
    pub prompt: Option<String>,
    pub count: u32,
}

/// Reply of the variation endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct VariationResponse {
    pub variations: Vec<String>,
}

/// Sketch-to-HTML generation: a PNG image in, a full mockup out.
pub trait GenerationBackend {
    fn generate(&self, png: &[u8]) -> Result<String, BackendError>;
}

/// Per-element variation generation.
pub trait VariationBackend {
    fn variations(&self, request: &VariationRequest) -> Result<Vec<String>, BackendError>;
}

/// Pulls the backend's `detail` message out of an error body, falling
/// back to a generic status description.
fn rejection(status: u16, body: &Value) -> BackendError {
    let detail = body
        .get("detail")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("backend request failed with status {status}"));
    BackendError::Rejected(detail)
}

/// Interprets a generation response. The `html` field is trimmed; an
/// empty or missing value is a failure, not an empty mockup.
pub fn parse_generate_response(status: u16, body: &Value) -> Result<String, BackendError> {
    if !(200..300).contains(&status) {
        return Err(rejection(status, body));
    }
    let response: GenerateResponse = serde_json::from_value(body.clone())
        .map_err(|e| BackendError::Malformed(e.to_string()))?;
    let html = response.html.trim();
    if html.is_empty() {
        return Err(BackendError::EmptyHtml);
    }
    Ok(html.to_owned())
}

/// Interprets a variation response.
pub fn parse_variation_response(status: u16, body: &Value) -> Result<Vec<String>, BackendError> {
    if !(200..300).contains(&status) {
        return Err(rejection(status, body));
    }
    let response: VariationResponse = serde_json::from_value(body.clone())
        .map_err(|e| BackendError::Malformed(e.to_string()))?;
    Ok(response.variations)
}
