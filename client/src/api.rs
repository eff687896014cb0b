//! HTTP client for the remote task API.
//!
//! [`ApiClient`] wraps the seven endpoints the board needs:
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | `POST` | `/auth/register` | none |
//! | `POST` | `/auth/login` | none |
//! | `GET` | `/auth/me` | bearer |
//! | `GET` | `/tasks` | bearer |
//! | `POST` | `/tasks` | bearer |
//! | `PATCH` | `/tasks/:id` | bearer |
//! | `DELETE` | `/tasks/:id` | bearer |
//!
//! The bearer token is looked up in the injected [`TokenStore`] on every
//! call, never cached, so a login in another process is picked up by the
//! next request.
//!
//! # Errors
//!
//! Every failure collapses into one of three [`ApiError`] kinds carrying a
//! single human-readable message. On a non-success status the message comes
//! from the `error` field of a JSON body when there is one; otherwise, and on
//! transport failures, a fixed message for the operation is used (for
//! example `"Failed to fetch tasks"`). Nothing is retried.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskdeck_client::api::ApiClient;
//! use taskdeck_client::session::FileTokenStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FileTokenStore::new("/home/user/.taskdeck"));
//!     let client = ApiClient::new("https://tasks.example.com/api", store)?;
//!
//!     for task in client.list_tasks().await? {
//!         println!("[{}] {}", task.status, task.title);
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::session::{SessionToken, TokenStore};
use crate::types::{AuthResponse, NewTask, Task, TaskPatch, User};

/// Message used when `current_user` is called without a stored token.
pub const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Errors returned by [`ApiClient`].
///
/// The three request kinds carry only a message; no status codes or
/// structured payloads leave this module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Registration, login or session check failed.
    #[error("{0}")]
    Auth(String),

    /// Reading tasks failed.
    #[error("{0}")]
    TaskFetch(String),

    /// Creating, updating or deleting a task failed.
    #[error("{0}")]
    TaskWrite(String),

    /// The client could not be constructed (bad base URL, TLS setup).
    #[error("client configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// The message to show the user.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            ApiError::Auth(message)
            | ApiError::TaskFetch(message)
            | ApiError::TaskWrite(message)
            | ApiError::Configuration(message) => message,
        }
    }
}

/// Remote operations, used to pick the error kind and fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Register,
    Login,
    CurrentUser,
    ListTasks,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Register => "register",
            Operation::Login => "login",
            Operation::CurrentUser => "current_user",
            Operation::ListTasks => "list_tasks",
            Operation::CreateTask => "create_task",
            Operation::UpdateTask => "update_task",
            Operation::DeleteTask => "delete_task",
        }
    }

    fn fallback_message(self) -> &'static str {
        match self {
            Operation::Register => "Registration failed",
            Operation::Login => "Login failed",
            Operation::CurrentUser => "Failed to fetch user",
            Operation::ListTasks => "Failed to fetch tasks",
            Operation::CreateTask => "Failed to create task",
            Operation::UpdateTask => "Failed to update task",
            Operation::DeleteTask => "Failed to delete task",
        }
    }

    fn error(self, message: impl Into<String>) -> ApiError {
        let message = message.into();
        match self {
            Operation::Register | Operation::Login | Operation::CurrentUser => {
                ApiError::Auth(message)
            }
            Operation::ListTasks => ApiError::TaskFetch(message),
            Operation::CreateTask | Operation::UpdateTask | Operation::DeleteTask => {
                ApiError::TaskWrite(message)
            }
        }
    }

    fn fallback(self) -> ApiError {
        self.error(self.fallback_message())
    }
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client for the remote task API.
///
/// Cheap to clone; clones share the connection pool and the token store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The underlying HTTP client.
    http_client: Client,

    /// Base URL every endpoint path is appended to.
    base_url: Url,

    /// Source of the bearer token, consulted on each request.
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Creates a client with the transport's default timeout behaviour.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if `base_url` is not an absolute
    /// http(s) URL or the HTTP client cannot be created.
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, tokens, None)
    }

    /// Creates a client with an optional per-request timeout.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::new`].
    pub fn with_timeout(
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::Configuration(format!("invalid base URL '{base_url}': {e}")))?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::Configuration(format!(
                "base URL must be an http(s) URL, got '{base_url}'"
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| {
            ApiError::Configuration(format!("failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            http_client,
            base_url,
            tokens,
        })
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the token store this client reads credentials from.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// [`ApiError::Auth`] if the server rejects the payload (duplicate
    /// email, weak password) or cannot be reached.
    pub async fn register(
        &self,
        name: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let op = Operation::Register;
        let body = RegisterRequest {
            name: name.map(str::trim).filter(|n| !n.is_empty()),
            email,
            password,
        };
        let request = self.http_client.post(self.endpoint(&["auth", "register"]));
        let response = self.send(op, request.json(&body)).await?;
        Self::decode(op, response).await
    }

    /// Exchanges credentials for a token.
    ///
    /// # Errors
    ///
    /// [`ApiError::Auth`] on wrong credentials or transport failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let op = Operation::Login;
        let body = LoginRequest { email, password };
        let request = self.http_client.post(self.endpoint(&["auth", "login"]));
        let response = self.send(op, request.json(&body)).await?;
        Self::decode(op, response).await
    }

    /// Fetches the user the stored token belongs to.
    ///
    /// Fails without touching the network when no token is stored.
    ///
    /// # Errors
    ///
    /// [`ApiError::Auth`] if the token is missing, expired or invalid. Callers
    /// should treat this as "no active session".
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let op = Operation::CurrentUser;
        let Some(token) = self.bearer() else {
            debug!("No stored token, skipping session check");
            return Err(op.error(NOT_AUTHENTICATED));
        };
        let request = self
            .http_client
            .get(self.endpoint(&["auth", "me"]))
            .header(AUTHORIZATION, bearer_value(&token));
        let response = self.send(op, request).await?;
        Self::decode(op, response).await
    }

    /// Lists the caller's tasks. Scoping to the user is done by the server.
    ///
    /// # Errors
    ///
    /// [`ApiError::TaskFetch`] on any non-success response or transport error.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let op = Operation::ListTasks;
        let request = self.authorized(self.http_client.get(self.endpoint(&["tasks"])));
        let response = self.send(op, request).await?;
        Self::decode(op, response).await
    }

    /// Creates a task. The title must already be validated as non-empty.
    ///
    /// # Errors
    ///
    /// [`ApiError::TaskWrite`] on any non-success response or transport error.
    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        let op = Operation::CreateTask;
        let request = self.authorized(self.http_client.post(self.endpoint(&["tasks"])));
        let response = self.send(op, request.json(task)).await?;
        Self::decode(op, response).await
    }

    /// Applies a partial update; only the fields set in `patch` change.
    ///
    /// # Errors
    ///
    /// [`ApiError::TaskWrite`] on any non-success response or transport error.
    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, ApiError> {
        let op = Operation::UpdateTask;
        let request = self.authorized(self.http_client.patch(self.endpoint(&["tasks", id])));
        let response = self.send(op, request.json(patch)).await?;
        Self::decode(op, response).await
    }

    /// Deletes a task.
    ///
    /// Whether deleting an unknown id fails is up to the server.
    ///
    /// # Errors
    ///
    /// [`ApiError::TaskWrite`] if the server reports failure or is unreachable.
    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let op = Operation::DeleteTask;
        let request = self.authorized(self.http_client.delete(self.endpoint(&["tasks", id])));
        self.send(op, request).await?;
        Ok(())
    }

    /// Builds `base_url/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Cannot fail: construction rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Reads the current token from the store.
    ///
    /// A store that cannot be read is treated like an empty one.
    fn bearer(&self) -> Option<SessionToken> {
        match self.tokens.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read session token, continuing without it");
                None
            }
        }
    }

    /// Attaches `Authorization: Bearer <token>` when a token is stored.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.bearer() {
            Some(token) => request.header(AUTHORIZATION, bearer_value(&token)),
            None => request,
        }
    }

    /// Sends a request and maps every failure onto `op`'s error kind.
    async fn send(&self, op: Operation, request: RequestBuilder) -> Result<Response, ApiError> {
        debug!(operation = op.name(), "Sending API request");

        let response = request.send().await.map_err(|e| {
            warn!(operation = op.name(), error = %e, "API request failed");
            op.fallback()
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        warn!(
            operation = op.name(),
            status = status.as_u16(),
            message = message.as_deref().unwrap_or(op.fallback_message()),
            "API request rejected"
        );

        Err(match message {
            Some(message) => op.error(message),
            None => op.fallback(),
        })
    }

    /// Decodes a JSON success body.
    async fn decode<T: DeserializeOwned>(op: Operation, response: Response) -> Result<T, ApiError> {
        response.json::<T>().await.map_err(|e| {
            warn!(operation = op.name(), error = %e, "Failed to decode API response");
            op.fallback()
        })
    }
}

fn bearer_value(token: &SessionToken) -> String {
    format!("Bearer {}", token.expose())
}

/// Pulls a non-empty `error` string out of a JSON error body.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;
    use crate::types::{Priority, TaskStatus};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer, store: Arc<MemoryTokenStore>) -> ApiClient {
        ApiClient::new(&mock_server.uri(), store).expect("failed to create test client")
    }

    fn task_json(id: &str, title: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "_id": id,
            "title": title,
            "status": status,
            "priority": "medium",
            "completed": status == "done",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-01T10:00:00.000Z"
        })
    }

    fn auth_json(token: &str) -> serde_json::Value {
        serde_json::json!({
            "token": token,
            "user": {"_id": "u1", "name": "Ada", "email": "ada@example.com"}
        })
    }

    // ==================== construction ====================

    #[test]
    fn new_rejects_invalid_base_url() {
        let result = ApiClient::new("not a url", Arc::new(MemoryTokenStore::new()));
        assert!(matches!(result, Err(ApiError::Configuration(_))));
    }

    #[test]
    fn new_rejects_non_http_scheme() {
        let result = ApiClient::new("mailto:ada@example.com", Arc::new(MemoryTokenStore::new()));
        assert!(matches!(result, Err(ApiError::Configuration(_))));
    }

    #[test]
    fn endpoint_appends_segments_to_base_path() {
        let client = ApiClient::new(
            "https://tasks.example.com/api/",
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(&["tasks", "42"]).as_str(),
            "https://tasks.example.com/api/tasks/42"
        );
    }

    #[test]
    fn endpoint_percent_encodes_ids() {
        let client =
            ApiClient::new("https://tasks.example.com", Arc::new(MemoryTokenStore::new())).unwrap();
        assert_eq!(
            client.endpoint(&["tasks", "a/b c"]).as_str(),
            "https://tasks.example.com/tasks/a%2Fb%20c"
        );
    }

    // ==================== error extraction ====================

    #[test]
    fn extract_error_message_reads_error_field() {
        assert_eq!(
            extract_error_message(r#"{"error": "Invalid credentials"}"#),
            Some("Invalid credentials".to_string())
        );
    }

    #[test]
    fn extract_error_message_ignores_other_shapes() {
        assert_eq!(extract_error_message("Internal Server Error"), None);
        assert_eq!(extract_error_message(r#"{"message": "nope"}"#), None);
        assert_eq!(extract_error_message(r#"{"error": {"code": 1}}"#), None);
        assert_eq!(extract_error_message(r#"{"error": "   "}"#), None);
        assert_eq!(extract_error_message(""), None);
    }

    #[test]
    fn api_error_display_is_the_message() {
        let err = ApiError::TaskFetch("Failed to fetch tasks".to_string());
        assert_eq!(err.to_string(), "Failed to fetch tasks");
        assert_eq!(err.message(), "Failed to fetch tasks");
    }

    // ==================== auth ====================

    #[tokio::test]
    async fn register_posts_payload_and_returns_session() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "secret1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(auth_json("jwt-1")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::new()));
        let auth = client
            .register(Some("Ada"), "ada@example.com", "secret1")
            .await
            .unwrap();

        assert_eq!(auth.token.expose(), "jwt-1");
        assert_eq!(auth.user.id, "u1");
        assert_eq!(auth.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn register_omits_blank_name() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(serde_json::json!({
                "email": "ada@example.com",
                "password": "secret1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(auth_json("jwt-1")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::new()));
        let result = client.register(Some("  "), "ada@example.com", "secret1").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn register_duplicate_email_uses_server_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "User already exists"})),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::new()));
        let result = client.register(None, "ada@example.com", "secret1").await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::Auth("User already exists".to_string())
        );
    }

    #[tokio::test]
    async fn login_returns_session_and_does_not_store_it() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(serde_json::json!({
                "email": "ada@example.com",
                "password": "secret1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_json("jwt-2")))
            .mount(&mock_server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let client = create_test_client(&mock_server, Arc::clone(&store));
        let auth = client.login("ada@example.com", "secret1").await.unwrap();

        assert_eq!(auth.token.expose(), "jwt-2");
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn login_accepts_user_with_both_id_keys() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "jwt-3",
                "user": {"_id": "u1", "id": "u1", "name": "Ada", "email": "ada@example.com"}
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::new()));
        let auth = client.login("ada@example.com", "secret1").await.unwrap();

        assert_eq!(auth.user.id, "u1");
    }

    #[tokio::test]
    async fn login_rejection_with_error_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "Invalid credentials"})),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::new()));
        let result = client.login("ada@example.com", "wrong-password").await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::Auth("Invalid credentials".to_string())
        );
    }

    #[tokio::test]
    async fn login_rejection_without_json_uses_fallback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::new()));
        let result = client.login("ada@example.com", "secret1").await;

        assert_eq!(result.unwrap_err(), ApiError::Auth("Login failed".to_string()));
    }

    #[tokio::test]
    async fn current_user_without_token_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::new()));
        let result = client.current_user().await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::Auth(NOT_AUTHENTICATED.to_string())
        );
    }

    #[tokio::test]
    async fn current_user_sends_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("Authorization", "Bearer jwt-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u1",
                "email": "ada@example.com"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("jwt-3")));
        let user = client.current_user().await.unwrap();

        assert_eq!(user.id, "u1");
        assert!(user.name.is_none());
    }

    #[tokio::test]
    async fn current_user_with_expired_token_is_auth_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "Invalid token"})),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("old")));
        let result = client.current_user().await;

        assert_eq!(result.unwrap_err(), ApiError::Auth("Invalid token".to_string()));
    }

    // ==================== tasks ====================

    #[tokio::test]
    async fn list_tasks_attaches_token_and_decodes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(header("Authorization", "Bearer jwt-4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                task_json("1", "A", "todo"),
                task_json("2", "B", "done")
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("jwt-4")));
        let tasks = client.list_tasks().await.unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "1");
        assert_eq!(tasks[1].status, TaskStatus::Done);
        assert!(tasks[1].completed);
    }

    #[tokio::test]
    async fn list_tasks_keeps_records_with_malformed_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                task_json("1", "A", "todo"),
                {"_id": "2", "id": "2", "title": "B", "status": null, "priority": null},
                {"_id": "3", "title": "C", "status": false, "priority": "urgent"}
            ])))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("jwt")));
        let tasks = client.list_tasks().await.unwrap();

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[1].id, "2");
        assert_eq!(tasks[1].status, TaskStatus::Todo);
        assert_eq!(tasks[1].priority, Priority::Medium);
        assert_eq!(tasks[2].status, TaskStatus::Other("false".to_string()));
        assert_eq!(tasks[2].priority, Priority::Medium);
    }

    #[tokio::test]
    async fn list_tasks_without_token_sends_no_authorization_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "No token provided"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::new()));
        let result = client.list_tasks().await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::TaskFetch("No token provided".to_string())
        );

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn token_is_read_from_store_on_every_call() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(header("Authorization", "Bearer first"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(header("Authorization", "Bearer rotated"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_token("first"));
        let client = create_test_client(&mock_server, Arc::clone(&store));

        client.list_tasks().await.unwrap();
        store.save(&SessionToken::new("rotated")).unwrap();
        client.list_tasks().await.unwrap();
    }

    #[tokio::test]
    async fn list_tasks_server_error_uses_fallback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("t")));
        let result = client.list_tasks().await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::TaskFetch("Failed to fetch tasks".to_string())
        );
    }

    #[tokio::test]
    async fn list_tasks_malformed_body_uses_fallback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("t")));
        let result = client.list_tasks().await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::TaskFetch("Failed to fetch tasks".to_string())
        );
    }

    #[tokio::test]
    async fn list_tasks_connection_error_uses_fallback() {
        let client = ApiClient::new("http://127.0.0.1:1", Arc::new(MemoryTokenStore::new()))
            .expect("should create client");

        let result = client.list_tasks().await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::TaskFetch("Failed to fetch tasks".to_string())
        );
    }

    #[tokio::test]
    async fn create_task_posts_new_task() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tasks"))
            .and(header("Authorization", "Bearer t"))
            .and(body_json(serde_json::json!({
                "title": "Buy Milk",
                "priority": "high"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(task_json("9", "Buy Milk", "todo")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("t")));
        let new_task = NewTask {
            priority: Some(Priority::High),
            ..NewTask::new("Buy Milk")
        };
        let task = client.create_task(&new_task).await.unwrap();

        assert_eq!(task.id, "9");
        assert_eq!(task.title, "Buy Milk");
    }

    #[tokio::test]
    async fn create_task_failure_is_write_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "Title is required"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("t")));
        let result = client.create_task(&NewTask::new("x")).await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::TaskWrite("Title is required".to_string())
        );
    }

    #[tokio::test]
    async fn update_task_sends_partial_patch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/tasks/42"))
            .and(body_json(serde_json::json!({"status": "done", "completed": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_json("42", "A", "done")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("t")));
        let task = client
            .update_task("42", &TaskPatch::status_change(TaskStatus::Done))
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::Done);
        assert!(task.completed);
    }

    #[tokio::test]
    async fn update_task_failure_uses_fallback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/tasks/42"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("t")));
        let result = client.update_task("42", &TaskPatch::default()).await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::TaskWrite("Failed to update task".to_string())
        );
    }

    #[tokio::test]
    async fn delete_task_accepts_empty_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/tasks/42"))
            .and(header("Authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("t")));
        assert!(client.delete_task("42").await.is_ok());
    }

    #[tokio::test]
    async fn delete_task_not_found_is_write_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/tasks/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "Task not found"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Arc::new(MemoryTokenStore::with_token("t")));
        let result = client.delete_task("missing").await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::TaskWrite("Task not found".to_string())
        );
    }

    #[tokio::test]
    async fn base_url_path_prefix_is_kept() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let base = format!("{}/api", mock_server.uri());
        let client = ApiClient::new(&base, Arc::new(MemoryTokenStore::with_token("t"))).unwrap();
        assert!(client.list_tasks().await.unwrap().is_empty());
    }
}
