//! AI-powered summarization of search results.
//!
//! A thin client for OpenAI-compatible chat-completion endpoints: format a
//! list of search results into a bounded prompt, issue one HTTP request, and
//! hand back the generated summary, either as a value ([`SummaryClient::generate`],
//! [`blocking::generate_summary`]) or as a lazy fragment stream
//! ([`SummaryClient::stream_summary`]). [`should_generate_summary`] gates
//! whether a call should be attempted at all.
//!
//! The crate performs exactly one request per call: no retries, no pooling
//! policy, no caching. Failures either come back as a failure-shaped
//! [`SummaryResponse`] (blocking path) or as a [`SummarizerError`]
//! (async and streaming paths).

pub mod blocking;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod prompt;
pub mod stream;
pub mod types;

pub use client::{SummaryClient, SummaryOptions};
pub use config::{
    AiSummarizerConfig, DEFAULT_MIN_RESULTS, DEFAULT_TIMEOUT_SECS, Preferences,
    should_generate_summary,
};
pub use error::SummarizerError;
pub use prompt::{DEFAULT_SYSTEM_PROMPT, format_results_for_prompt, sanitize_url};
pub use stream::SummaryStream;
pub use types::{ResultRecord, SearchResult, SummaryResponse, SummaryStats, Usage};
