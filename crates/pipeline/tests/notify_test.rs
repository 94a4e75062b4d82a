//! Webhook delivery against a real HTTP server

use apidiff_task_common::DiffResult;
use apidiff_task_loader::{HttpClientOptions, ReqwestClient};
use apidiff_task_pipeline::{NotifyStatus, TaskHost, TaskOutcome, WebhookNotifier};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct DebugLog(Vec<String>);

impl TaskHost for DebugLog {
    fn error(&mut self, _message: &str) {}
    fn warning(&mut self, _message: &str) {}
    fn info(&mut self, _message: &str) {}

    fn debug(&mut self, message: &str) {
        self.0.push(message.to_string());
    }

    fn set_result(&mut self, _outcome: &TaskOutcome) {}
}

fn client() -> Arc<ReqwestClient> {
    Arc::new(ReqwestClient::new(&HttpClientOptions::default()).unwrap())
}

#[tokio::test]
async fn test_payload_round_trips_through_webhook() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result: DiffResult = serde_json::from_value(json!({
        "breakingDifferencesFound": true,
        "breakingDifferences": [{
            "type": "breaking",
            "action": "remove",
            "code": "path.remove",
            "entity": "path",
            "source": "openapi-diff",
            "sourceSpecEntityDetails": [{"location": "paths./pets", "value": {"get": {}}}],
            "destinationSpecEntityDetails": []
        }],
        "nonBreakingDifferences": [],
        "unclassifiedDifferences": []
    }))
    .unwrap();

    let notifier = WebhookNotifier::new(client(), format!("{}/hook", mock_server.uri()));
    let mut log = DebugLog::default();
    let status = notifier.notify(&result, &mut log).await;
    assert_eq!(status, NotifyStatus::Sent(200));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let received: DiffResult = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(received, result);
    assert_eq!(log.0.len(), 1);
    assert!(log.0[0].starts_with("Sent notification to webhook"));
}

#[tokio::test]
async fn test_classic_payload_is_verbatim() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let raw = json!({
        "errors": [{"ruleId": "delete-path", "message": "/pets removed", "path": "/pets"}],
        "warnings": [{"ruleId": "add-optional-param", "message": "limit added"}],
        "infos": [],
        "raw": {"changes": 2}
    });
    let result: DiffResult = serde_json::from_value(raw.clone()).unwrap();

    let notifier = WebhookNotifier::new(client(), mock_server.uri());
    let status = notifier.notify(&result, &mut DebugLog::default()).await;
    assert_eq!(status, NotifyStatus::Sent(201));

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, raw);
}

#[tokio::test]
async fn test_non_breaking_result_is_not_posted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result: DiffResult = serde_json::from_value(json!({
        "errors": [],
        "warnings": [{"ruleId": "edit-description", "message": "changed"}],
        "infos": []
    }))
    .unwrap();

    let notifier = WebhookNotifier::new(client(), mock_server.uri());
    let mut log = DebugLog::default();
    let status = notifier.notify(&result, &mut log).await;

    assert_eq!(status, NotifyStatus::Skipped);
    assert!(log.0.is_empty());
}

#[tokio::test]
async fn test_unreachable_webhook_is_logged_only() {
    let result: DiffResult = serde_json::from_value(json!({
        "errors": [{"ruleId": "R1", "message": "removed field"}],
        "warnings": [],
        "infos": []
    }))
    .unwrap();

    let notifier = WebhookNotifier::new(client(), "http://127.0.0.1:9/hook");
    let mut log = DebugLog::default();
    let status = notifier.notify(&result, &mut log).await;

    assert!(matches!(status, NotifyStatus::Failed(_)));
    assert_eq!(log.0.len(), 1);
    assert!(log.0[0].starts_with("Failed to send notification to webhook http://127.0.0.1:9/hook"));
}
