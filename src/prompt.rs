//! Prompt construction: result formatting, content truncation, and defensive
//! URL sanitization.

use tracing::debug;
use url::Url;

use crate::types::ResultRecord;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes search results.
Your task is to provide a concise, accurate summary of the provided search results.
Focus on the most relevant information and present it in a clear, readable format.
If the results contain conflicting information, mention this briefly.
Keep the summary factual and based on the provided results.";

/// Maximum number of results embedded in a prompt.
pub const MAX_PROMPT_RESULTS: usize = 10;

/// Total content budget shared across all embedded results, in characters.
pub const MAX_CONTENT_LENGTH: usize = 4000;

const INVALID_URL_PLACEHOLDER: &str = "[Invalid URL]";

/// Validate a URL before embedding it in prompt text.
///
/// Returns the input unchanged when it parses and its host survives IDNA
/// encoding, and the literal `[Invalid URL]` otherwise. Total: never panics,
/// never errors. Empty input passes through untouched.
pub fn sanitize_url(url: &str) -> &str {
    if url.is_empty() {
        return url;
    }

    // The url crate runs IDNA on the host during parsing, so hostnames with
    // characters like U+203A fail here rather than downstream.
    match Url::parse(url) {
        Ok(_) => url,
        Err(_) => {
            debug!("Skipping URL with invalid hostname: {}", url);
            INVALID_URL_PLACEHOLDER
        }
    }
}

/// Format search results into the block embedded in the summary prompt:
/// query and result headers followed by numbered entries.
///
/// Entries without a title and without content are skipped; the rest get a
/// 1-based numbered block with the title, a truncated content line, and a
/// sanitized URL line. Yields the literal `No results found.` when nothing
/// qualifies.
pub fn format_results_for_prompt<R: ResultRecord>(results: &[R], query: &str) -> String {
    format_results(results, query, MAX_PROMPT_RESULTS, MAX_CONTENT_LENGTH)
}

pub fn format_results<R: ResultRecord>(
    results: &[R],
    query: &str,
    max_results: usize,
    max_content_length: usize,
) -> String {
    let per_result_budget = max_content_length / max_results.max(1);
    let mut lines: Vec<String> = vec![
        format!("Search Query: {query}"),
        String::new(),
        "Search Results:".to_string(),
        String::new(),
    ];
    let mut result_count = 0usize;

    for result in results {
        if result_count >= max_results {
            break;
        }

        let title = result.title();
        let content = result.content();
        let url = result.url();

        if title.is_empty() && content.is_empty() {
            continue;
        }

        result_count += 1;
        lines.push(format!("{}. {}", result_count, title));

        if !content.is_empty() {
            lines.push(format!(
                "   Content: {}",
                truncate_chars(content, per_result_budget)
            ));
        }

        if !url.is_empty() {
            lines.push(format!("   URL: {}", sanitize_url(url)));
        }

        lines.push(String::new());
    }

    if result_count == 0 {
        lines.push("No results found.".to_string());
    }

    lines.join("\n")
}

/// Wrap the formatted result block in the instruction template the model
/// receives as the user message. The template carries the formatting rules
/// the summary must follow (Markdown, 50-300 words, no mid-sentence
/// truncation).
pub fn build_user_prompt(formatted_results: &str) -> String {
    format!(
        "{formatted_results}

Please provide a concise, well-structured summary of these search results that directly answers the query.

IMPORTANT: Your response must be:
- Between 50 and 300 words
- Complete sentences (never cut off mid-sentence)
- Well-structured with clear beginning and end

Format your response using Markdown:
- Use **bold** for emphasis on key points
- Use bullet points (-) for lists
- Use numbered lists (1., 2., etc.) for steps or ranked items
- Add paragraph breaks between different topics
- Use proper formatting to make it easy to read

Focus on the most relevant and reliable information."
    )
}

/// Character-based truncation with an ellipsis marker. Operates on scalar
/// values so multi-byte text is never split mid-character.
fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(budget).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchResult;

    fn result(title: &str, content: &str, url: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            content: content.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn formats_numbered_entries() {
        let results = vec![
            result("First", "alpha", "https://example.com/a"),
            result("Second", "beta", "https://example.com/b"),
        ];
        let formatted = format_results_for_prompt(&results, "query");
        assert!(formatted.starts_with("Search Query: query"));
        assert!(formatted.contains("Search Results:"));
        assert!(formatted.contains("1. First"));
        assert!(formatted.contains("   Content: alpha"));
        assert!(formatted.contains("   URL: https://example.com/a"));
        assert!(formatted.contains("2. Second"));
    }

    #[test]
    fn skips_entries_without_title_and_content() {
        let results = vec![
            result("", "", "https://example.com/skip"),
            result("Kept", "", ""),
        ];
        let formatted = format_results_for_prompt(&results, "query");
        assert!(!formatted.contains("example.com/skip"));
        assert!(formatted.contains("1. Kept"));
    }

    #[test]
    fn caps_entry_count() {
        let results: Vec<SearchResult> = (0..15)
            .map(|i| result(&format!("Title {i}"), "text", ""))
            .collect();
        let formatted = format_results_for_prompt(&results, "query");
        assert!(formatted.contains("10. Title 9"));
        assert!(!formatted.contains("11. Title 10"));
    }

    #[test]
    fn truncates_long_content_with_ellipsis() {
        let long = "x".repeat(500);
        let results = vec![result("Long", &long, "")];
        let formatted = format_results_for_prompt(&results, "query");
        // Budget is 4000 / 10 = 400 characters per entry.
        assert!(formatted.contains(&format!("   Content: {}...", "x".repeat(400))));
        assert!(!formatted.contains(&"x".repeat(401)));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(10);
        let truncated = truncate_chars(&text, 4);
        assert_eq!(truncated, format!("{}...", "é".repeat(4)));
    }

    #[test]
    fn short_content_is_untouched() {
        assert_eq!(truncate_chars("short", 400), "short");
    }

    #[test]
    fn empty_results_emit_marker() {
        let results: Vec<SearchResult> = Vec::new();
        let formatted = format_results_for_prompt(&results, "query");
        assert!(formatted.ends_with("No results found."));
    }

    #[test]
    fn only_unqualified_results_emit_marker() {
        let results = vec![result("", "", "https://example.com")];
        let formatted = format_results_for_prompt(&results, "query");
        assert!(formatted.ends_with("No results found."));
        assert!(!formatted.contains("1. "));
    }

    #[test]
    fn sanitize_url_accepts_valid_urls() {
        let url = "https://example.com/path?q=1";
        assert_eq!(sanitize_url(url), url);
    }

    #[test]
    fn sanitize_url_rejects_invalid_idna_hosts() {
        // U+203A in the hostname fails IDNA encoding.
        assert_eq!(sanitize_url("https://exa\u{203a}mple.com"), "[Invalid URL]");
    }

    #[test]
    fn sanitize_url_rejects_unparseable_input() {
        assert_eq!(sanitize_url("http://[not-a-host"), "[Invalid URL]");
        assert_eq!(sanitize_url("no scheme at all"), "[Invalid URL]");
    }

    #[test]
    fn sanitize_url_passes_empty_and_hostless_input() {
        assert_eq!(sanitize_url(""), "");
        let mailto = "mailto:user@example.com";
        assert_eq!(sanitize_url(mailto), mailto);
    }

    #[test]
    fn user_prompt_appends_formatting_rules() {
        let prompt = build_user_prompt("Search Query: rust\n\nSearch Results:\n\n1. Entry");
        assert!(prompt.starts_with("Search Query: rust"));
        assert!(prompt.contains("1. Entry"));
        assert!(prompt.contains("Between 50 and 300 words"));
    }
}
