//! Gemini client against a one-shot local HTTP server

use pretty_assertions::assert_eq;
use sba_dataset::DatasetSample;
use sba_narrative::{
    GeminiClient, GeminiConfig, GenerationParams, ModelClient, ModelError, NarrativeError,
    NarrativeGenerator, NarrativeResult,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve exactly one response and hand back the raw request
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());

    let task = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            if request_complete(&request) {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (base_url, task)
}

fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    request.len() >= header_end + 4 + content_length
}

fn gemini_reply(text: &str) -> String {
    json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]}).to_string()
}

fn one_row() -> DatasetSample {
    let mut row = Map::new();
    row.insert("Product".into(), Value::String("Tea".into()));
    DatasetSample::from_rows(vec!["Product".into()], vec![row])
}

#[tokio::test]
async fn posts_prompt_and_generation_config() {
    let (base_url, server) = serve_once("200 OK", gemini_reply("{\"summary\":\"ok\"}")).await;
    let client = GeminiClient::new(
        GeminiConfig::default()
            .with_api_key("test-key")
            .with_base_url(base_url),
    );

    let text = client
        .complete("hello model", &GenerationParams::default())
        .await
        .unwrap();
    assert_eq!(text, "{\"summary\":\"ok\"}");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/models/gemini-2.0-flash:generateContent HTTP/1.1"));
    assert!(request
        .lines()
        .any(|line| line.eq_ignore_ascii_case("x-goog-api-key: test-key")));
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let body: Value = serde_json::from_str(body).unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], json!("hello model"));
    assert_eq!(body["generationConfig"]["topK"], json!(40));
    assert_eq!(body["generationConfig"]["maxOutputTokens"], json!(8192));
}

#[tokio::test]
async fn error_status_is_model_failure() {
    let (base_url, server) = serve_once("500 Internal Server Error", "{\"error\":\"boom\"}".into()).await;
    let client = GeminiClient::new(
        GeminiConfig::default()
            .with_api_key("test-key")
            .with_base_url(base_url),
    );

    let err = client
        .complete("prompt", &GenerationParams::default())
        .await
        .unwrap_err();
    match err {
        ModelError::Status { status, ref body } => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn empty_candidates_surface_through_generator() {
    let (base_url, server) = serve_once("200 OK", json!({"candidates": []}).to_string()).await;
    let client = GeminiClient::new(
        GeminiConfig::default()
            .with_api_key("test-key")
            .with_base_url(base_url),
    );
    let generator = NarrativeGenerator::new(Arc::new(client));

    let err = generator
        .generate_for_label(&one_row(), "niche_market")
        .await
        .unwrap_err();
    assert!(matches!(err, NarrativeError::ModelInvocation(ModelError::EmptyResponse)));
    assert_eq!(
        err.to_string(),
        "Failed to analyze data with AI: No text generated from API response"
    );
    server.await.unwrap();
}

#[tokio::test]
async fn fenced_reply_is_decoded_end_to_end() {
    let reply = "```json\n{\"summary\": \"two niches\", \"nicheMarkets\": []}\n```";
    let (base_url, server) = serve_once("200 OK", gemini_reply(reply)).await;
    let client = GeminiClient::new(
        GeminiConfig::default()
            .with_api_key("test-key")
            .with_base_url(base_url),
    );
    let generator = NarrativeGenerator::new(Arc::new(client));

    let result = generator
        .generate_for_label(&one_row(), "niche_market")
        .await
        .unwrap();
    assert_eq!(
        result,
        NarrativeResult::Structured(json!({"summary": "two niches", "nicheMarkets": []}))
    );

    let request = server.await.unwrap();
    assert!(request.contains("[{\\\"Product\\\":\\\"Tea\\\"}]"));
}

#[tokio::test]
async fn transport_errors_never_carry_the_key() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
    drop(listener);

    let client = GeminiClient::new(
        GeminiConfig::default()
            .with_api_key("SENTINEL-KEY-7731")
            .with_base_url(base_url),
    );
    let generator = NarrativeGenerator::new(Arc::new(client));

    let err = generator
        .generate_for_label(&one_row(), "niche_market")
        .await
        .unwrap_err();
    assert!(matches!(err, NarrativeError::ModelInvocation(ModelError::Request(_))));
    assert!(!err.to_string().contains("SENTINEL-KEY-7731"), "{err}");
    assert!(!format!("{err:?}").contains("SENTINEL-KEY-7731"), "{err:?}");
}
