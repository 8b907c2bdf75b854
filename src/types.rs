//! Value types exchanged with callers: result records going in, summary
//! responses coming back.

use serde::{Deserialize, Serialize};

/// Capability interface for anything the caller wants summarized.
///
/// The prompt formatter only needs these three accessors; callers with richer
/// result types implement the trait instead of converting up front.
pub trait ResultRecord {
    fn title(&self) -> &str;
    fn content(&self) -> &str;
    fn url(&self) -> &str;
}

/// Plain result record, the normalization boundary for callers that prefer
/// converting once over implementing [`ResultRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
}

impl ResultRecord for SearchResult {
    fn title(&self) -> &str {
        &self.title
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn url(&self) -> &str {
        &self.url
    }
}

/// Token usage reported by the upstream API. Missing fields default to zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl Usage {
    pub(crate) fn from_response(value: &serde_json::Value) -> Option<Self> {
        let usage = value.get("usage")?;
        Some(Self {
            prompt_tokens: usage
                .get("prompt_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            completion_tokens: usage
                .get("completion_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            total_tokens: usage
                .get("total_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
        })
    }
}

/// Derived statistics attached by the blocking variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryStats {
    #[serde(flatten)]
    pub usage: Usage,
    pub model: String,
    /// Wall-clock request/response time in seconds.
    pub response_time: f64,
}

/// Outcome of one summarization call. Immutable; produced once per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: Option<String>,
    pub error: Option<String>,
    pub model: String,
    /// ISO-8601 timestamp captured at call start.
    pub timestamp: String,
    pub usage: Option<Usage>,
    pub stats: Option<SummaryStats>,
}

impl SummaryResponse {
    pub(crate) fn completed(
        summary: String,
        model: &str,
        timestamp: String,
        usage: Option<Usage>,
        stats: Option<SummaryStats>,
    ) -> Self {
        Self {
            success: true,
            summary: Some(summary),
            error: None,
            model: model.to_string(),
            timestamp,
            usage,
            stats,
        }
    }

    pub(crate) fn failed(error: impl Into<String>, model: &str, timestamp: String) -> Self {
        Self {
            success: false,
            summary: None,
            error: Some(error.into()),
            model: model.to_string(),
            timestamp,
            usage: None,
            stats: None,
        }
    }
}
