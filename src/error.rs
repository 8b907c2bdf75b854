//! Error types for the summarizer client.

/// Errors surfaced by the async and streaming paths.
///
/// The blocking path never returns these; it folds every failure into a
/// failure-shaped [`SummaryResponse`](crate::types::SummaryResponse) so
/// callers only branch on the `success` flag.
#[derive(Debug, thiserror::Error)]
pub enum SummarizerError {
    /// The request exceeded the configured timeout.
    #[error("Request timed out after {timeout}s")]
    Timeout { timeout: f64 },

    /// The upstream returned an error status, the transport failed, or the
    /// response shape was unusable.
    #[error("{0}")]
    Api(String),
}

impl SummarizerError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
