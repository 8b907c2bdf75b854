//! Typed user preferences and the gate deciding whether summarization runs.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_TIMEOUT_SECS: f64 = 15.0;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MIN_RESULTS: usize = 3;

/// User preferences relevant to this crate. Owned by the caller, read-only
/// here; unknown fields elsewhere in the caller's preference store are not
/// our concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    #[serde(default)]
    pub ai_summarizer: AiSummarizerConfig,
}

/// Summarizer sub-config. Every field is optional on the wire and falls back
/// to a safe default, so a partially-filled preference store deserializes
/// cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiSummarizerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_min_results")]
    pub min_results: usize,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub model: String,
}

impl Default for AiSummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_results: default_min_results(),
            endpoint: String::new(),
            model: String::new(),
        }
    }
}

fn default_min_results() -> usize {
    DEFAULT_MIN_RESULTS
}

/// Decide whether a summary should be attempted at all.
///
/// True only when preferences are present, the summarizer is enabled, the
/// result count meets the configured minimum, and both endpoint and model
/// are set. Pure apart from a debug log on missing configuration.
pub fn should_generate_summary(preferences: Option<&Preferences>, results_count: usize) -> bool {
    let Some(preferences) = preferences else {
        return false;
    };

    let config = &preferences.ai_summarizer;
    if !config.enabled {
        return false;
    }

    if results_count < config.min_results {
        return false;
    }

    if config.endpoint.is_empty() || config.model.is_empty() {
        debug!("AI summarization enabled but endpoint or model not configured");
        return false;
    }

    true
}
