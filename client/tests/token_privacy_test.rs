//! Secret hygiene tests for the session token and passwords.
//!
//! The bearer token and the user's password must never show up in log
//! output, even at TRACE level, nor in `Debug` renderings of client types.
//!
//! # Test Approach
//!
//! 1. Install a tracing Layer that captures every event's fields
//! 2. Drive the board through sign-in, restore, task writes and rejection
//! 3. Assert the token and password strings are absent from the captured logs

use std::sync::{Arc, Mutex};

use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskdeck_client::{ApiClient, Board, MemoryTokenStore, NewTask, SessionToken, TokenStore};

const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.c2VjcmV0LXNlc3Npb24.signature-value";
const PASSWORD: &str = "correct horse battery staple";

// ============================================================================
// Log Capture Infrastructure
// ============================================================================

#[derive(Clone, Default)]
struct LogCapture {
    logs: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    fn get_logs(&self) -> String {
        self.logs.lock().unwrap().join("\n")
    }
}

/// A tracing Layer that records every event as `[LEVEL] target: fields`.
struct CaptureLayer {
    capture: LogCapture,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = StringVisitor::default();
        event.record(&mut visitor);

        let message = format!(
            "[{}] {}: {}",
            event.metadata().level(),
            event.metadata().target(),
            visitor.parts.join(" ")
        );
        self.capture.logs.lock().unwrap().push(message);
    }
}

#[derive(Default)]
struct StringVisitor {
    parts: Vec<String>,
}

impl tracing::field::Visit for StringVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.parts.push(format!("{}={:?}", field.name(), value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.parts.push(format!("{}={}", field.name(), value));
    }
}

/// Installs a TRACE-level capturing subscriber for the current thread.
///
/// Capture stops when the returned guard is dropped.
fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let layer = CaptureLayer {
        capture: capture.clone(),
    };

    let subscriber = tracing_subscriber::registry()
        .with(layer.with_filter(tracing_subscriber::filter::LevelFilter::TRACE));

    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}

fn assert_secrets_not_in_logs(logs: &str, context: &str) {
    assert!(
        !logs.contains(TOKEN),
        "Session token found in logs during {context}!\nLogs:\n{logs}"
    );
    assert!(
        !logs.contains("eyJ"),
        "JWT prefix 'eyJ' found in logs during {context}!\nLogs:\n{logs}"
    );
    assert!(
        !logs.contains(PASSWORD),
        "Password found in logs during {context}!\nLogs:\n{logs}"
    );
}

fn user_json() -> serde_json::Value {
    serde_json::json!({"_id": "u1", "name": "Ada", "email": "ada@example.com"})
}

// ============================================================================
// Test Cases
// ============================================================================

#[tokio::test]
async fn token_and_password_not_logged_during_sign_in_and_task_writes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": TOKEN,
            "user": user_json()
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "_id": "t1",
            "title": "Buy milk",
            "status": "todo"
        })))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = ApiClient::new(&mock_server.uri(), store.clone()).unwrap();
    let mut board = Board::new(client);

    let (capture, guard) = capture_logs();
    board.login("ada@example.com", PASSWORD).await.unwrap();
    board.create_task(NewTask::new("Buy milk")).await.unwrap();
    tracing::debug!(board = ?board, "board state");
    drop(guard);
    let logs = capture.get_logs();

    assert_eq!(store.load().unwrap().unwrap().expose(), TOKEN);
    assert!(!logs.is_empty(), "expected some log output");
    assert_secrets_not_in_logs(&logs, "sign-in and task writes");
}

#[tokio::test]
async fn token_not_logged_when_stored_session_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "Invalid token"
        })))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_token(TOKEN));
    let client = ApiClient::new(&mock_server.uri(), store.clone()).unwrap();
    let mut board = Board::new(client);

    let (capture, guard) = capture_logs();
    assert!(!board.restore_session().await);
    drop(guard);
    let logs = capture.get_logs();

    assert!(store.load().unwrap().is_none());
    assert_secrets_not_in_logs(&logs, "session rejection");
}

#[tokio::test]
async fn password_not_logged_when_login_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "Invalid credentials"
        })))
        .mount(&mock_server)
        .await;

    let client =
        ApiClient::new(&mock_server.uri(), Arc::new(MemoryTokenStore::new())).unwrap();
    let mut board = Board::new(client);

    let (capture, guard) = capture_logs();
    assert!(board.login("ada@example.com", PASSWORD).await.is_err());
    drop(guard);
    let logs = capture.get_logs();

    assert_eq!(board.error(), Some("Invalid credentials"));
    assert_secrets_not_in_logs(&logs, "failed login");
}

#[test]
fn debug_output_redacts_token() {
    let token = SessionToken::new(TOKEN);
    let store = MemoryTokenStore::with_token(TOKEN);

    assert!(!format!("{token:?}").contains(TOKEN));
    assert!(!format!("{store:?}").contains(TOKEN));
}
