//! Inference engine reached over HTTP.
//!
//! Each prediction is a `POST` of
//! `{"smiles": .., "target": "logP"|"pKa", "fast_mode": bool, "model": "h2o"|"gnn"}`
//! answered by `{"value": f64}`. A `422 Unprocessable Entity` marks the SMILES
//! as malformed.

use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use crate::error::{FluoroError, Result};

use super::provider::{EngineError, InferenceEngine, PredictionRequest};

/// Default prediction endpoint.
const DEFAULT_API_URL: &str = "http://localhost:8000/predict";

/// Environment variable overriding the endpoint.
pub const ENGINE_URL_ENV: &str = "FLUORO_ENGINE_URL";

/// Configuration for [`HttpEngine`].
#[derive(Debug, Clone)]
pub struct HttpEngineConfig {
    /// Prediction endpoint.
    pub url: String,
    /// Per-request timeout. Slow mode on large molecules can take minutes.
    pub timeout: Duration,
}

impl Default for HttpEngineConfig {
    fn default() -> Self {
        let url = std::env::var(ENGINE_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self {
            url,
            timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    value: Option<f64>,
    #[serde(default)]
    error: Option<String>,
}

/// Map a service answer to a predicted value or an engine error.
fn prediction_from_response(
    status: StatusCode,
    body: &str,
    identifier: &str,
) -> std::result::Result<f64, EngineError> {
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return Err(EngineError::MalformedIdentifier(format!(
            "{}: {}",
            identifier,
            body.trim()
        )));
    }
    if !status.is_success() {
        return Err(EngineError::Internal(format!("{}: {}", status, body.trim())));
    }

    let parsed: PredictionResponse =
        serde_json::from_str(body).map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

    match (parsed.value, parsed.error) {
        (Some(value), _) if value.is_finite() => Ok(value),
        (Some(value), _) => Err(EngineError::InvalidResponse(format!(
            "non-finite value {}",
            value
        ))),
        (None, Some(error)) => Err(EngineError::Internal(error)),
        (None, None) => Err(EngineError::InvalidResponse("missing 'value'".to_string())),
    }
}

/// Remote inference engine.
pub struct HttpEngine {
    client: Client,
    config: HttpEngineConfig,
}

impl HttpEngine {
    /// Create an engine with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(HttpEngineConfig::default())
    }

    /// Create an engine for a specific endpoint.
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        Self::with_config(HttpEngineConfig {
            url: url.into(),
            ..HttpEngineConfig::default()
        })
    }

    /// Create with custom configuration.
    pub fn with_config(config: HttpEngineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                FluoroError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Build headers for API requests.
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

impl InferenceEngine for HttpEngine {
    fn predict(&self, request: &PredictionRequest<'_>) -> std::result::Result<f64, EngineError> {
        let body = json!({
            "smiles": request.identifier,
            "target": request.property.engine_target(),
            "fast_mode": request.parameters.conformers.is_fast(),
            "model": request.parameters.model.engine_name(),
        });

        debug!("POST {} for {} ({})", self.config.url, request.identifier, request.property);

        let response = self
            .client
            .post(&self.config.url)
            .headers(self.build_headers())
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    EngineError::Unavailable(format!("{}: {}", self.config.url, e))
                } else {
                    EngineError::Internal(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
        prediction_from_response(status, &body, request.identifier)
    }

    fn name(&self) -> &str {
        "http"
    }
}
