//! End-to-end export flow against a mocked Discord API with the real
//! HTML renderer.

use chatslice::discord::DiscordClient;
use chatslice::errors::ExportError;
use chatslice::export::{ExportOutcome, ExportRequest, Exporter};
use chatslice::model::{ChannelId, MessageId};
use chatslice::render::{HtmlRenderer, RenderOptions};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WORDS: [&str; 5] = ["alpha", "bravo", "charlie", "delta", "echo"];

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::seconds(secs)
}

fn msg_json(id: u64) -> serde_json::Value {
    json!({
        "id": id.to_string(),
        "channel_id": "100",
        "author": {"id": "1", "username": "sam"},
        "content": WORDS[(id - 1) as usize],
        "timestamp": ts(id as i64 * 10).to_rfc3339(),
        "attachments": []
    })
}

/// Channel 100 with messages 1..=5 ("alpha".."echo"), ten seconds apart.
async fn mock_channel(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/channels/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "100", "name": "general"
        })))
        .mount(server)
        .await;

    for id in 1..=5_u64 {
        Mock::given(method("GET"))
            .and(path(format!("/channels/100/messages/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(msg_json(id)))
            .mount(server)
            .await;
    }

    // History pages, newest-first, keyed by the after-cursor.
    Mock::given(method("GET"))
        .and(path("/channels/100/messages"))
        .and(query_param("after", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            msg_json(5),
            msg_json(4),
            msg_json(3),
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/channels/100/messages"))
        .and(query_param("after", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            msg_json(5),
            msg_json(4),
        ])))
        .mount(server)
        .await;
}

fn request(dir: &TempDir, name: &str, start: u64, end: u64) -> ExportRequest {
    ExportRequest {
        channel_id: ChannelId(100),
        start_id: MessageId(start),
        end_id: MessageId(end),
        output_path: dir.path().join(name),
        options: RenderOptions::default(),
    }
}

#[tokio::test]
async fn exports_the_inclusive_range_in_ascending_order() {
    let server = MockServer::start().await;
    mock_channel(&server).await;
    let tmp = TempDir::new().unwrap();
    let exporter = Exporter::new(
        DiscordClient::with_base_url("test_token", server.uri()),
        HtmlRenderer,
    );

    // start=id(T4), end=id(T2): the transcript is exactly [T2, T3, T4].
    let outcome = exporter.export(&request(&tmp, "out.html", 4, 2)).await.unwrap();
    assert!(matches!(outcome, ExportOutcome::Written(_)));

    let html = std::fs::read_to_string(tmp.path().join("out.html")).unwrap();
    assert!(!html.contains("alpha"), "{html}");
    assert!(!html.contains("echo"), "{html}");
    let bravo = html.find("bravo").unwrap();
    let charlie = html.find("charlie").unwrap();
    let delta = html.find("delta").unwrap();
    assert!(bravo < charlie && charlie < delta, "{html}");
}

#[tokio::test]
async fn swapped_boundaries_produce_byte_identical_output() {
    let server = MockServer::start().await;
    mock_channel(&server).await;
    let tmp = TempDir::new().unwrap();
    let exporter = Exporter::new(
        DiscordClient::with_base_url("test_token", server.uri()),
        HtmlRenderer,
    );

    exporter.export(&request(&tmp, "a.html", 2, 4)).await.unwrap();
    exporter.export(&request(&tmp, "b.html", 4, 2)).await.unwrap();

    let a = std::fs::read(tmp.path().join("a.html")).unwrap();
    let b = std::fs::read(tmp.path().join("b.html")).unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn adjacent_boundaries_render_both_messages_only() {
    let server = MockServer::start().await;
    mock_channel(&server).await;
    let tmp = TempDir::new().unwrap();
    let exporter = Exporter::new(
        DiscordClient::with_base_url("test_token", server.uri()),
        HtmlRenderer,
    );

    exporter.export(&request(&tmp, "out.html", 3, 4)).await.unwrap();

    let html = std::fs::read_to_string(tmp.path().join("out.html")).unwrap();
    assert!(html.contains("charlie") && html.contains("delta"), "{html}");
    assert!(!html.contains("bravo") && !html.contains("echo"), "{html}");
}

#[tokio::test]
async fn missing_boundary_fails_and_writes_nothing() {
    let server = MockServer::start().await;
    mock_channel(&server).await;
    Mock::given(method("GET"))
        .and(path("/channels/100/messages/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Unknown Message", "code": 10008
        })))
        .mount(&server)
        .await;
    let tmp = TempDir::new().unwrap();
    let exporter = Exporter::new(
        DiscordClient::with_base_url("test_token", server.uri()),
        HtmlRenderer,
    );

    let err = exporter
        .export(&request(&tmp, "out.html", 999, 2))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::MessageResolution {
            message_id: MessageId(999),
            ..
        }
    ));
    assert!(!tmp.path().join("out.html").exists());
}

#[tokio::test]
async fn unresolvable_channel_fails_before_any_message_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/100"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "Missing Access", "code": 50001
        })))
        .mount(&server)
        .await;
    let tmp = TempDir::new().unwrap();
    let exporter = Exporter::new(
        DiscordClient::with_base_url("test_token", server.uri()),
        HtmlRenderer,
    );

    let err = exporter
        .export(&request(&tmp, "out.html", 2, 4))
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::ChannelResolution { .. }));
    assert!(err.to_string().contains("Missing Access"));
    assert!(!tmp.path().join("out.html").exists());
}
