//! HTTP backend against a wiremock server.

use forgeconf::{ApiKey, BackendConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use logoforge::audio;
use logoforge::contract::{Availability, Category, ContractLayer};
use logoforge::BackendError;

const FAST: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

fn layer(server: &MockServer) -> ContractLayer {
    let config = BackendConfig {
        base_url: server.uri(),
        ..Default::default()
    };
    ContractLayer::gemini(&config, ApiKey::new("test-key")).unwrap()
}

fn text_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
}

#[tokio::test]
async fn test_naming_candidates_for_nova() {
    let server = MockServer::start().await;
    let payload = json!([
        { "domain": "nova.tech", "availabilitySim": "Available", "reasoning": "Exact match on a tech TLD." },
        { "domain": "novahq.com", "availabilitySim": "Premium", "reasoning": "Short .com, aftermarket." },
        { "domain": "nova.io", "availabilitySim": "Taken", "reasoning": "Registered." }
    ]);

    Mock::given(method("POST"))
        .and(path(FAST))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY" }
            }
        })))
        .respond_with(text_reply(&payload.to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let suggestions = layer(&server)
        .domain_scout("Nova", Category::Tech)
        .await
        .unwrap();

    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[0].domain, "nova.tech");
    assert_eq!(suggestions[1].availability_sim, Availability::Premium);
    assert_eq!(suggestions[2].availability_sim, Availability::Taken);
}

#[tokio::test]
async fn test_naming_candidates_malformed_is_empty_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FAST))
        .respond_with(text_reply(
            r#"[{"domain":"nova.tech","availabilitySim":"Maybe","reasoning":"?"}]"#,
        ))
        .mount(&server)
        .await;

    let suggestions = layer(&server)
        .domain_scout("Nova", Category::Tech)
        .await
        .unwrap();
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn test_http_error_is_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let err = layer(&server)
        .bundle_metadata(Category::Luxury)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BackendError::Status {
            status: 429,
            body: "quota exhausted".to_string()
        }
    );
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = layer(&server).color_remix(Category::Minimal).await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn test_trademark_uses_reasoning_model_and_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-3-pro-preview:generateContent"))
        .and(body_partial_json(json!({ "tools": [{ "googleSearch": {} }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "No conflicts found." }] },
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "uri": "https://tm.example/aurum", "title": "TM search" } }
                ]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = layer(&server)
        .trademark_safety(Category::Luxury, "Aurum")
        .await
        .unwrap();
    assert_eq!(report.text, "No conflicts found.");
    assert_eq!(report.citations.len(), 1);
    assert_eq!(report.citations[0].uri.as_deref(), Some("https://tm.example/aurum"));
}

#[tokio::test]
async fn test_competitors_send_location() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash-lite-latest:generateContent"))
        .and(body_partial_json(json!({
            "tools": [{ "googleMaps": {} }],
            "toolConfig": { "retrievalConfig": { "latLng": { "latitude": 37.77, "longitude": -122.42 } } }
        })))
        .respond_with(text_reply("Whitespace in minimal fintech marks."))
        .expect(1)
        .mount(&server)
        .await;

    let report = layer(&server)
        .local_competitors(Category::Tech, 37.77, -122.42)
        .await
        .unwrap();
    assert!(report.citations.is_empty());
    assert!(report.text.starts_with("Whitespace"));
}

#[tokio::test]
async fn test_brand_voice_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": { "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": "Kore" } } }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [
                // 0, 16384, -32768 as little-endian PCM16
                { "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAAAQACA" } }
            ]}}]
        })))
        .mount(&server)
        .await;

    let payload = layer(&server)
        .brand_voice("Design bold.")
        .await
        .unwrap()
        .expect("audio payload");
    let buffer = audio::decode_payload(payload.as_str(), 24_000, 1).unwrap();
    assert_eq!(buffer.channels[0], vec![0.0, 0.5, -1.0]);
}

#[tokio::test]
async fn test_brand_voice_declined_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [],
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let payload = layer(&server).brand_voice("").await.unwrap();
    assert!(payload.is_none());
}
