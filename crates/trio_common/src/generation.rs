//! Generation client - one synchronous prompt -> text call against a local endpoint
//!
//! Ollama-style `/api/generate`. The response envelope is not standardized, so
//! the text is looked up in a configurable list of field names. Every
//! failure is reported as a `GenerationError`; no retry happens here.

use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::config::GenerationSettings;

/// Per-call sampling and timeout options
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub timeout: Duration,
}

/// Generation service unavailable. Every variant is fatal for the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation service not reachable: {0}")]
    NotAvailable(String),

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// 404 from Ollama, carrying the requested model
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("HTTP {0} from generation service")]
    HttpStatus(u16),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl GenerationError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GenerationError::Timeout(_))
    }
}

/// Checklist printed when the generation service cannot be used
pub fn remediation_checklist(endpoint: &str, model: &str) -> Vec<String> {
    let base = reqwest::Url::parse(endpoint)
        .map(|u| u.origin().ascii_serialization())
        .unwrap_or_else(|_| endpoint.to_string());
    vec![
        "Is Ollama running? (open the Ollama app or start the service)".to_string(),
        format!("Have you pulled the model? `ollama pull {}`", model),
        format!("Can you `curl {}/` ?", base),
    ]
}

/// Anything that can turn a prompt into text
pub trait TextGenerator {
    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, GenerationError>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, GenerationError> {
        (**self).generate(prompt, options)
    }
}

/// Request body for /api/generate
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    pub options: SamplingOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct SamplingOptions {
    pub temperature: f32,
}

/// HTTP client for a local Ollama-compatible endpoint
pub struct OllamaGenerator {
    endpoint: String,
    model: String,
    text_fields: Vec<String>,
    client: reqwest::blocking::Client,
}

impl OllamaGenerator {
    pub fn new(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            text_fields: settings.text_fields.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn map_transport_error(e: reqwest::Error, timeout: Duration) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(timeout)
        } else if e.is_connect() {
            GenerationError::NotAvailable(e.to_string())
        } else {
            GenerationError::Transport(e.to_string())
        }
    }
}

impl TextGenerator for OllamaGenerator {
    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: SamplingOptions {
                temperature: options.temperature,
            },
        };

        debug!(
            "POST {} (model {}, prompt {} bytes, temperature {})",
            self.endpoint,
            self.model,
            prompt.len(),
            options.temperature
        );

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(options.timeout)
            .json(&request)
            .send()
            .map_err(|e| Self::map_transport_error(e, options.timeout))?;

        let status = response.status();
        if !status.is_success() {
            // Ollama answers 404 when the model has not been pulled
            if status.as_u16() == 404 {
                return Err(GenerationError::ModelNotFound(self.model.clone()));
            }
            return Err(GenerationError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| Self::map_transport_error(e, options.timeout))?;
        let envelope: Value = serde_json::from_str(&body)
            .map_err(|e| GenerationError::MalformedEnvelope(e.to_string()))?;

        Ok(text_from_envelope(&envelope, &self.text_fields))
    }
}

/// Best-effort text from a response envelope
///
/// For each text field in order: a string value wins, then an object's
/// `content`, then the `content` of a list's first object. Falls back to the
/// whole envelope serialized as JSON.
pub fn text_from_envelope(envelope: &Value, text_fields: &[String]) -> String {
    if let Value::Object(map) = envelope {
        for field in text_fields {
            let Some(val) = map.get(field) else {
                continue;
            };
            let text = match val {
                Value::String(s) => Some(s.as_str()),
                Value::Object(inner) => inner.get("content").and_then(Value::as_str),
                Value::Array(items) => items
                    .first()
                    .and_then(Value::as_object)
                    .and_then(|first| first.get("content"))
                    .and_then(Value::as_str),
                _ => None,
            };
            if let Some(text) = text {
                return text.to_string();
            }
        }
    }

    debug!("No text field held text, returning the raw envelope");
    envelope.to_string()
}

/// Replays canned responses, for tests and offline runs
///
/// Responses are consumed in order; the last one repeats once the queue is
/// down to a single entry.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Mutex<Vec<(String, GenerateOptions)>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script of successful raw responses
    pub fn from_texts<S: Into<String>>(texts: Vec<S>) -> Self {
        Self::new(texts.into_iter().map(|t| Ok(t.into())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Prompts received so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|(p, _)| p.clone()).collect())
            .unwrap_or_default()
    }

    /// Options received so far, in order
    pub fn options(&self) -> Vec<GenerateOptions> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|(_, o)| o.clone()).collect())
            .unwrap_or_default()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, GenerationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((prompt.to_string(), options.clone()));
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| GenerationError::NotAvailable("script poisoned".to_string()))?;

        match responses.len() {
            0 => Err(GenerationError::NotAvailable("script exhausted".to_string())),
            1 => responses[0].clone(),
            _ => responses
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::NotAvailable("script exhausted".to_string()))),
        }
    }
}
