//! Async completion client: one POST per call, JSON response parsing, and
//! model discovery.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client as HttpClient;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::{AiSummarizerConfig, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS};
use crate::endpoint::{chat_completions_url, models_url};
use crate::error::SummarizerError;
use crate::prompt::{DEFAULT_SYSTEM_PROMPT, build_user_prompt, format_results_for_prompt};
use crate::types::{ResultRecord, SummaryResponse, Usage};

pub(crate) const NO_COMPLETION_ERROR: &str = "No completion returned from API";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MODELS_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-call generation settings. Endpoint and model are required; the rest
/// default to the same values the upstream system shipped with.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub system_prompt: Option<String>,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl SummaryOptions {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
            system_prompt: None,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn from_config(config: &AiSummarizerConfig) -> Self {
        Self::new(config.endpoint.clone(), config.model.clone())
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn timeout_secs(&self) -> f64 {
        self.timeout.as_secs_f64()
    }
}

/// Client for one OpenAI-compatible chat-completion endpoint.
pub struct SummaryClient {
    pub(crate) http: HttpClient,
    pub(crate) options: SummaryOptions,
}

impl SummaryClient {
    pub fn new(options: SummaryOptions) -> Self {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self { http, options }
    }

    pub fn options(&self) -> &SummaryOptions {
        &self.options
    }

    pub(crate) fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.options.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => builder.bearer_auth(key),
            _ => builder,
        }
    }

    /// Generate a summary of the given results.
    ///
    /// A response without choices is a normal failure outcome (`Ok` with
    /// `success: false`); timeouts, error statuses, and transport failures
    /// are returned as [`SummarizerError`].
    pub async fn generate<R: ResultRecord>(
        &self,
        results: &[R],
        query: &str,
    ) -> Result<SummaryResponse, SummarizerError> {
        let timestamp = Utc::now().to_rfc3339();
        let url = chat_completions_url(&self.options.endpoint);
        let payload = completion_payload(&self.options, results, query, false);

        let response = self
            .authorize(self.http.post(&url))
            .timeout(self.options.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|err| translate_transport_error(&err, self.options.timeout_secs()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = compose_status_error(status.as_u16(), &body);
            warn!(status = %status, "{}", message);
            return Err(SummarizerError::Api(message));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|err| translate_transport_error(&err, self.options.timeout_secs()))?;

        Ok(parse_completion(&data, &self.options.model, timestamp))
    }

    /// Fetch the model IDs the endpoint advertises.
    ///
    /// Every failure degrades to an empty list; model discovery is advisory
    /// and must never break the caller.
    pub async fn fetch_available_models(&self) -> Vec<String> {
        let url = models_url(&self.options.endpoint);
        let request = self
            .authorize(self.http.get(&url))
            .timeout(MODELS_TIMEOUT);

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Error fetching models from {}: {}", url, err);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            warn!(
                "Error fetching models from {}: HTTP {}",
                url,
                response.status()
            );
            return Vec::new();
        }

        match response.json::<Value>().await {
            Ok(data) => {
                let models: Vec<String> = data
                    .get("data")
                    .and_then(|d| d.as_array())
                    .map(|entries| {
                        entries
                            .iter()
                            .filter_map(|entry| entry.get("id").and_then(|id| id.as_str()))
                            .filter(|id| !id.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                debug!("Fetched {} models from {}", models.len(), url);
                models
            }
            Err(err) => {
                warn!("Error fetching models from {}: {}", url, err);
                Vec::new()
            }
        }
    }
}

/// Build the chat-completion request body shared by the async, blocking, and
/// streaming paths.
pub(crate) fn completion_payload<R: ResultRecord>(
    options: &SummaryOptions,
    results: &[R],
    query: &str,
    stream: bool,
) -> Value {
    let formatted_results = format_results_for_prompt(results, query);
    let user_prompt = build_user_prompt(&formatted_results);
    let system_prompt = options
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);

    let mut payload = json!({
        "model": options.model,
        "messages": [
            {"role": "system", "content": system_prompt},
            {"role": "user", "content": user_prompt},
        ],
        "max_tokens": options.max_tokens,
        "temperature": options.temperature,
    });

    if stream {
        payload["stream"] = json!(true);
    }

    payload
}

/// Turn a parsed completion body into the summary outcome.
pub(crate) fn parse_completion(data: &Value, model: &str, timestamp: String) -> SummaryResponse {
    let choice = data
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first());

    let Some(choice) = choice else {
        warn!("No choices in API response");
        return SummaryResponse::failed(NO_COMPLETION_ERROR, model, timestamp);
    };

    let summary = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .trim()
        .to_string();

    let usage = Usage::from_response(data);
    debug!("Generated summary using model {}", model);

    SummaryResponse::completed(summary, model, timestamp, usage, None)
}

/// Compose the diagnostic for a non-2xx status, folding in the provider's
/// nested error message when the body carries one.
pub(crate) fn compose_status_error(status: u16, body: &str) -> String {
    let message = format!("API returned error: {status}");
    if let Ok(data) = serde_json::from_str::<Value>(body) {
        if let Some(provider_message) = data
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
        {
            return format!("{message} - {provider_message}");
        }
    }
    message
}

/// Map a transport-level failure to the matching error kind.
pub(crate) fn translate_transport_error(err: &reqwest::Error, timeout_secs: f64) -> SummarizerError {
    if err.is_timeout() {
        warn!("Timeout generating summary: {}", err);
        SummarizerError::Timeout {
            timeout: timeout_secs,
        }
    } else {
        warn!("Request error generating summary: {}", err);
        SummarizerError::Api(format!("Request failed: {err}"))
    }
}
