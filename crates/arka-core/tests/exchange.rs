//! Exchanges against a mock chat endpoint.

use std::time::Duration;

use arka_core::{
    Body, ChatClient, ChatController, ChatMessage, ExchangeError, InputField, MessageId, Outcome,
    TranscriptView,
};
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ERROR_MESSAGE: &str = "Maaf, terjadi kesalahan. Coba lagi.";

struct Input(String);

impl InputField for Input {
    fn value(&self) -> &str {
        &self.0
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

#[derive(Default)]
struct View {
    appended: Vec<MessageId>,
    updated: Vec<MessageId>,
}

impl TranscriptView for View {
    fn append(&mut self, id: MessageId, _message: &ChatMessage) {
        self.appended.push(id);
    }

    fn update(&mut self, id: MessageId, _message: &ChatMessage) {
        self.updated.push(id);
    }

    fn scroll_to_end(&mut self) {}
}

fn controller_for(server: &MockServer) -> ChatController {
    let client = ChatClient::new(&format!("{}/chat", server.uri()));
    ChatController::new(client, ERROR_MESSAGE)
}

/// Submit `text`, run its exchange and apply the result.
async fn round_trip(controller: &mut ChatController, view: &mut View, text: &str) -> MessageId {
    let mut input = Input(text.to_string());
    let pending = controller
        .submit(&mut input, view)
        .expect("non-empty input should submit");
    let placeholder = pending.placeholder;
    let resolution = controller.exchanger().exchange(pending).await;
    controller.resolve(resolution, view).unwrap();
    placeholder
}

#[tokio::test]
async fn success_renders_markdown_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "message": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "**bold**" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller_for(&server);
    let mut view = View::default();
    let placeholder = round_trip(&mut controller, &mut view, "  hello ").await;

    let message = controller.transcript().get(placeholder).unwrap();
    assert!(message.rendered_as_markup());
    assert!(message.content().contains("<strong>bold</strong>"));
    assert!(!message.content().contains("**"));
    assert_eq!(view.updated, vec![placeholder]);
}

#[tokio::test]
async fn whitespace_input_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let mut controller = controller_for(&server);
    let mut view = View::default();
    let mut input = Input(" \t ".to_string());

    assert!(controller.submit(&mut input, &mut view).is_none());
    assert!(controller.transcript().is_empty());
    assert!(view.appended.is_empty());
}

#[tokio::test]
async fn non_ok_status_shows_error_even_with_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "response": "this must not be shown",
            "error": "Maaf, terjadi kesalahan saat menghasilkan jawaban."
        })))
        .mount(&server)
        .await;

    let mut controller = controller_for(&server);
    let mut view = View::default();
    let placeholder = round_trip(&mut controller, &mut view, "hi").await;

    let message = controller.transcript().get(placeholder).unwrap();
    assert!(!message.rendered_as_markup());
    assert_eq!(message.content(), ERROR_MESSAGE);
}

#[tokio::test]
async fn network_failure_shows_error() {
    let server = MockServer::start().await;
    let endpoint = format!("{}/chat", server.uri());
    drop(server);

    let mut controller = ChatController::new(ChatClient::new(&endpoint), ERROR_MESSAGE);
    let mut view = View::default();
    let placeholder = round_trip(&mut controller, &mut view, "hi").await;

    assert_eq!(
        controller.transcript().get(placeholder).unwrap().content(),
        ERROR_MESSAGE
    );
}

#[tokio::test]
async fn malformed_json_shows_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let mut controller = controller_for(&server);
    let mut view = View::default();
    let placeholder = round_trip(&mut controller, &mut view, "hi").await;

    assert_eq!(
        controller.transcript().get(placeholder).unwrap().content(),
        ERROR_MESSAGE
    );
}

#[tokio::test]
async fn missing_or_mistyped_response_field_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({ "message": "missing" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "wrong key" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_json(json!({ "message": "mistyped" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": 42 })))
        .mount(&server)
        .await;

    let client = ChatClient::new(&format!("{}/chat", server.uri()));
    assert!(matches!(
        client.send("missing").await,
        Err(ExchangeError::Decode(_))
    ));
    assert!(matches!(
        client.send("mistyped").await,
        Err(ExchangeError::Decode(_))
    ));
}

#[tokio::test]
async fn client_reports_status_for_non_ok() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(json!({ "error": "Layanan belum terinisialisasi" })),
        )
        .mount(&server)
        .await;

    let client = ChatClient::new(&format!("{}/chat", server.uri()));
    match client.send("hi").await {
        Err(ExchangeError::Status(status)) => assert_eq!(status.as_u16(), 503),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn overlapping_exchanges_resolve_in_arrival_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({ "message": "slow" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "slow reply" }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_json(json!({ "message": "fast" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "fast reply" })))
        .mount(&server)
        .await;

    let mut controller = controller_for(&server);
    let mut view = View::default();

    let slow = controller.submit(&mut Input("slow".to_string()), &mut view).unwrap();
    let fast = controller.submit(&mut Input("fast".to_string()), &mut view).unwrap();
    let (slow_id, fast_id) = (slow.placeholder, fast.placeholder);

    assert_eq!(controller.transcript().len(), 4);
    assert_eq!(controller.transcript().pending_count(), 2);

    let (tx, mut rx) = mpsc::unbounded_channel();
    for pending in [slow, fast] {
        let exchanger = controller.exchanger();
        let tx = tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(exchanger.exchange(pending).await);
        });
    }
    drop(tx);

    while let Some(resolution) = rx.recv().await {
        controller.resolve(resolution, &mut view).unwrap();
    }

    // The later send came back first
    assert_eq!(view.updated, vec![fast_id, slow_id]);
    assert_eq!(controller.transcript().pending_count(), 0);

    let slow_msg = controller.transcript().get(slow_id).unwrap();
    let fast_msg = controller.transcript().get(fast_id).unwrap();
    assert_eq!(
        slow_msg.body,
        Body::Markup {
            markdown: "slow reply".to_string(),
            html: "<p>slow reply</p>\n".to_string(),
        }
    );
    assert!(fast_msg.content().contains("fast reply"));
    assert_eq!(
        slow_msg.state,
        Some(arka_core::ExchangeState::Resolved(Outcome::Success))
    );
}
