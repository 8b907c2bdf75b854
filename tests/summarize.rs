//! End-to-end exercise of the public surface: gate, prompt, client, and
//! stream against a mock chat-completion endpoint.

use std::time::Duration;

use futures::StreamExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ai_summarizer::{
    AiSummarizerConfig, Preferences, SearchResult, SummaryClient, SummaryOptions,
    should_generate_summary,
};

fn results() -> Vec<SearchResult> {
    vec![
        SearchResult {
            title: "Rust async book".to_string(),
            content: "Asynchronous programming in Rust.".to_string(),
            url: "https://rust-lang.github.io/async-book/".to_string(),
        },
        SearchResult {
            title: "Tokio".to_string(),
            content: "A runtime for writing reliable network applications.".to_string(),
            url: "https://tokio.rs".to_string(),
        },
        SearchResult {
            title: "Futures".to_string(),
            content: "Zero-cost asynchronous programming.".to_string(),
            url: "https://docs.rs/futures".to_string(),
        },
    ]
}

fn preferences(endpoint: &str) -> Preferences {
    Preferences {
        ai_summarizer: AiSummarizerConfig {
            enabled: true,
            min_results: 3,
            endpoint: endpoint.to_string(),
            model: "test-model".to_string(),
        },
    }
}

#[tokio::test]
async fn gated_generate_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": "Rust offers async via tokio and futures."}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 20, "total_tokens": 140}
        })))
        .mount(&server)
        .await;

    let prefs = preferences(&server.uri());
    let results = results();
    assert!(should_generate_summary(Some(&prefs), results.len()));

    let options = SummaryOptions::from_config(&prefs.ai_summarizer)
        .with_timeout(Duration::from_secs(5));
    let client = SummaryClient::new(options);
    let response = client.generate(&results, "rust async").await.expect("summary");

    assert!(response.success);
    assert_eq!(
        response.summary.as_deref(),
        Some("Rust offers async via tokio and futures.")
    );
    assert_eq!(response.usage.unwrap().total_tokens, 140);
}

#[tokio::test]
async fn gate_skips_below_min_results() {
    let prefs = preferences("http://localhost");
    assert!(!should_generate_summary(Some(&prefs), 2));
}

#[tokio::test]
async fn streaming_round_trip_concatenates_to_full_summary() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Rust \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"is \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"fast.\"}}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = SummaryClient::new(SummaryOptions::new(server.uri(), "test-model"));
    let mut stream = client
        .stream_summary(&results(), "rust")
        .await
        .expect("stream opens");

    let mut summary = String::new();
    while let Some(fragment) = stream.next().await {
        summary.push_str(&fragment.expect("fragment"));
    }
    assert_eq!(summary, "Rust is fast.");
}

#[tokio::test]
async fn model_discovery_feeds_configuration() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": "test-model"}, {"id": "other-model"}]
        })))
        .mount(&server)
        .await;

    let client = SummaryClient::new(SummaryOptions::new(server.uri(), "test-model"));
    let models = client.fetch_available_models().await;
    assert!(models.contains(&"test-model".to_string()));
}
