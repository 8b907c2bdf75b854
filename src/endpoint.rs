//! Base-URL handling for OpenAI-compatible endpoints.

/// Whether a base URL already points at an OpenAI-compatible root (".../v1").
pub fn is_openai_compatible_base_url(base_url: &str) -> bool {
    base_url.trim_end_matches('/').ends_with("/v1")
}

/// Normalize a configured endpoint to the versioned API root.
/// "https://api.example.com" and "https://api.example.com/v1/" both map to
/// "https://api.example.com/v1".
pub fn normalize_base_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if is_openai_compatible_base_url(trimmed) {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}

pub fn chat_completions_url(endpoint: &str) -> String {
    format!("{}/chat/completions", normalize_base_url(endpoint))
}

pub fn models_url(endpoint: &str) -> String {
    format!("{}/models", normalize_base_url(endpoint))
}
