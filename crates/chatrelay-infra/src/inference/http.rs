//! HttpInferenceClient -- [`InferenceClient`] over a JSON HTTP endpoint.
//!
//! POSTs `{prompt, max_tokens, temperature, model?}` to the configured URL
//! and returns the decoded JSON body. Some gateways wrap the payload as
//! `{"success": true, "result": ...}`; that envelope is removed here so core
//! only sees the model output.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

use chatrelay_core::inference::client::{InferenceClient, InferenceRequest};
use chatrelay_observe::genai_attrs::{
    GEN_AI_OPERATION_NAME, GEN_AI_PROVIDER_NAME, GEN_AI_REQUEST_MAX_TOKENS, GEN_AI_REQUEST_MODEL,
    GEN_AI_REQUEST_TEMPERATURE, OP_TEXT_COMPLETION, span_name,
};
use chatrelay_types::config::InferenceConfig;
use chatrelay_types::error::InferenceError;

/// Inference client for a single HTTP completion endpoint.
///
/// Intentionally does not derive Debug; the key never reaches log output.
pub struct HttpInferenceClient {
    client: reqwest::Client,
    endpoint: Option<String>,
    model: Option<String>,
    api_key: Option<SecretString>,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    #[serde(flatten)]
    request: &'a InferenceRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

impl HttpInferenceClient {
    /// Build a client from config, reading the API key from the environment
    /// variable named by `api_key_env` (absent or empty means no key).
    pub fn from_config(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .map(SecretString::from);
        Self::new(config, api_key)
    }

    pub fn new(config: &InferenceConfig, api_key: Option<SecretString>) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone().filter(|url| !url.is_empty()),
            model: config.model.clone(),
            api_key,
            timeout_secs: config.timeout_secs,
        })
    }

    /// The configured endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn map_send_error(&self, err: reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout(self.timeout_secs)
        } else {
            InferenceError::Request(format!("HTTP request failed: {err}"))
        }
    }
}

/// Map a non-success status to an inference error.
fn status_error(status: StatusCode, body: String, model: &str) -> InferenceError {
    match status {
        StatusCode::NOT_FOUND | StatusCode::SERVICE_UNAVAILABLE => {
            InferenceError::Unavailable(model.to_string())
        }
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => InferenceError::Provider {
            message: format!("HTTP {status}: upstream timeout"),
        },
        _ => InferenceError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

/// Strip a top-level `{"success": ..., "result": ...}` envelope.
///
/// Only objects whose keys are `result` and optionally `success` count as
/// an envelope; anything else is a model response shape and passes through.
fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map)
            if map.contains_key("result")
                && map.keys().all(|key| key == "result" || key == "success") =>
        {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

impl InferenceClient for HttpInferenceClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<Value, InferenceError> {
        let model = self.model.as_deref().unwrap_or("default");
        let span = tracing::info_span!(
            "gen_ai.complete",
            otel.name = tracing::field::Empty,
            gen_ai.operation.name = tracing::field::Empty,
            gen_ai.provider.name = tracing::field::Empty,
            gen_ai.request.model = tracing::field::Empty,
            gen_ai.request.max_tokens = tracing::field::Empty,
            gen_ai.request.temperature = tracing::field::Empty,
        );
        span.record("otel.name", span_name(OP_TEXT_COMPLETION, model).as_str());
        span.record(GEN_AI_OPERATION_NAME, OP_TEXT_COMPLETION);
        span.record(GEN_AI_PROVIDER_NAME, self.name());
        span.record(GEN_AI_REQUEST_MODEL, model);
        span.record(GEN_AI_REQUEST_MAX_TOKENS, request.max_tokens);
        span.record(GEN_AI_REQUEST_TEMPERATURE, f64::from(request.temperature));

        self.post(request, model).instrument(span).await
    }
}

impl HttpInferenceClient {
    async fn post(&self, request: &InferenceRequest, model: &str) -> Result<Value, InferenceError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Err(InferenceError::Unavailable(
                "no inference endpoint configured".to_string(),
            ));
        };

        let body = CompletionBody {
            request,
            model: self.model.as_deref(),
        };
        let mut builder = self.client.post(endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(status_error(status, error_body, model));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| InferenceError::Provider {
                message: format!("failed to parse response: {e}"),
            })?;

        tracing::debug!("Inference response received");
        Ok(unwrap_envelope(body))
    }
}
