//! Blocking variant. Occupies the calling thread for one request/response
//! cycle and never propagates an error: every failure becomes a
//! failure-shaped [`SummaryResponse`], so callers only branch on `success`.

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::blocking::Client as BlockingHttpClient;
use serde_json::Value;
use tracing::warn;

use crate::client::{SummaryOptions, completion_payload, compose_status_error, parse_completion};
use crate::endpoint::chat_completions_url;
use crate::types::{ResultRecord, SummaryResponse, SummaryStats};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Generate a summary, blocking the calling thread.
///
/// On success the response additionally carries [`SummaryStats`] with the
/// wall-clock response time. Must not be called from within an async
/// runtime; use [`SummaryClient::generate`](crate::SummaryClient::generate)
/// there instead.
pub fn generate_summary<R: ResultRecord>(
    results: &[R],
    query: &str,
    options: &SummaryOptions,
) -> SummaryResponse {
    let timestamp = Utc::now().to_rfc3339();
    let model = options.model.as_str();
    let url = chat_completions_url(&options.endpoint);
    let payload = completion_payload(options, results, query, false);

    let http = match BlockingHttpClient::builder()
        .timeout(options.timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
    {
        Ok(http) => http,
        Err(err) => {
            warn!("Unexpected error generating summary: {}", err);
            return SummaryResponse::failed(format!("Unexpected error: {err}"), model, timestamp);
        }
    };

    let mut request = http.post(&url).json(&payload);
    if let Some(key) = options.api_key.as_deref().filter(|key| !key.trim().is_empty()) {
        request = request.bearer_auth(key);
    }

    let started = Instant::now();

    let response = match request.send() {
        Ok(response) => response,
        Err(err) if err.is_timeout() => {
            warn!("Timeout generating summary");
            return SummaryResponse::failed(
                format!("Request timed out after {}s", options.timeout_secs()),
                model,
                timestamp,
            );
        }
        Err(err) => {
            warn!("Request error generating summary: {}", err);
            return SummaryResponse::failed(format!("Request failed: {err}"), model, timestamp);
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().unwrap_or_default();
        let message = compose_status_error(status.as_u16(), &body);
        warn!(status = %status, "{}", message);
        return SummaryResponse::failed(message, model, timestamp);
    }

    let data: Value = match response.json() {
        Ok(data) => data,
        Err(err) if err.is_timeout() => {
            warn!("Timeout generating summary");
            return SummaryResponse::failed(
                format!("Request timed out after {}s", options.timeout_secs()),
                model,
                timestamp,
            );
        }
        Err(err) => {
            warn!("Unexpected error generating summary: {}", err);
            return SummaryResponse::failed(format!("Unexpected error: {err}"), model, timestamp);
        }
    };

    let response_time = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;

    let mut summary = parse_completion(&data, model, timestamp);
    if summary.success {
        summary.stats = Some(SummaryStats {
            usage: summary.usage.unwrap_or_default(),
            model: model.to_string(),
            response_time,
        });
    }
    summary
}
