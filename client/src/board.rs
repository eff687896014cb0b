//! Board controller: session lifecycle, task cache and view parameters.
//!
//! [`Board`] is what the front ends (the command line and the interactive
//! board) drive. It owns the [`ApiClient`], the [`TaskCache`] and the
//! current [`AuthState`], and turns every user intent into at most one remote
//! call whose result is reconciled into the cache by identifier.
//!
//! # Session restore
//!
//! Startup is a two-step handshake modelled as an explicit state machine:
//!
//! ```text
//!                 no stored token
//!   Unauthenticated <──────────────┐
//!        │                          │ token rejected (token cleared)
//!        │ restore_session()        │
//!        ▼                          │
//!    Restoring ─────────────────────┘
//!        │ GET /auth/me ok
//!        ▼
//!   Authenticated(user) ──logout()──> Unauthenticated
//! ```
//!
//! # Errors
//!
//! Every operation returns a [`Result`] for callers that need it, and also
//! records the failure's message in [`Board::error`], so a front end can show
//! it inline. No failure leaves the board unusable.

use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, NOT_AUTHENTICATED};
use crate::cache::TaskCache;
use crate::error::{ClientError, Result};
use crate::session::SessionToken;
use crate::types::{NewTask, Task, TaskPatch, TaskStatus, User};
use crate::validation::{require_password, validate_email, validate_password, validate_title};
use crate::view::{derive_view, StatusFilter, ViewState};

/// Authentication state of the board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No session; the login form is shown.
    #[default]
    Unauthenticated,

    /// A stored token is being checked against the server.
    Restoring,

    /// Signed in as this user.
    Authenticated(User),
}

impl AuthState {
    /// Returns the signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// The task board and the session it belongs to.
#[derive(Debug)]
pub struct Board {
    client: ApiClient,
    tasks: TaskCache,
    auth: AuthState,
    filter: StatusFilter,
    search: String,
    error: Option<String>,
}

impl Board {
    /// Creates an unauthenticated board with an empty cache.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            tasks: TaskCache::new(),
            auth: AuthState::Unauthenticated,
            filter: StatusFilter::All,
            search: String::new(),
            error: None,
        }
    }

    // ==================== session ====================

    /// Attempts to resume the session from the stored token.
    ///
    /// With no stored token this makes no network call. A token the server
    /// rejects is removed from the store. Neither case is reported as an
    /// error. On success the task list is fetched.
    ///
    /// Returns `true` if the board ends up authenticated.
    pub async fn restore_session(&mut self) -> bool {
        self.auth = AuthState::Restoring;

        let has_token = match self.client.tokens().load() {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored session");
                false
            }
        };

        if !has_token {
            debug!("No stored session");
            self.auth = AuthState::Unauthenticated;
            return false;
        }

        match self.client.current_user().await {
            Ok(user) => {
                info!(user_id = %user.id, "Session restored");
                self.auth = AuthState::Authenticated(user);
                // A failed fetch is recorded in `error`; the session stays valid.
                let _ = self.refresh().await;
                true
            }
            Err(e) => {
                info!(reason = %e, "Stored session rejected, signing out");
                if let Err(e) = self.client.tokens().clear() {
                    warn!(error = %e, "Failed to remove rejected session token");
                }
                self.auth = AuthState::Unauthenticated;
                false
            }
        }
    }

    /// Signs in with email and password.
    ///
    /// On success the token is stored, the board becomes authenticated and
    /// the task list is fetched. On failure nothing is stored and the board
    /// stays unauthenticated.
    ///
    /// # Errors
    ///
    /// Validation, API or token store failures.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User> {
        self.error = None;

        let email = match validate_email(email) {
            Ok(email) => email,
            Err(e) => return self.fail(e),
        };
        if let Err(e) = require_password(password) {
            return self.fail(e);
        }

        match self.client.login(email, password).await {
            Ok(auth) => self.start_session(auth.token, auth.user).await,
            Err(e) => self.fail(e),
        }
    }

    /// Creates an account and signs in with it.
    ///
    /// The password must be at least six characters long; shorter ones are
    /// rejected without contacting the server.
    ///
    /// # Errors
    ///
    /// Validation, API or token store failures.
    pub async fn register(
        &mut self,
        name: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<User> {
        self.error = None;

        let email = match validate_email(email) {
            Ok(email) => email,
            Err(e) => return self.fail(e),
        };
        if let Err(e) = validate_password(password) {
            return self.fail(e);
        }

        match self.client.register(name, email, password).await {
            Ok(auth) => self.start_session(auth.token, auth.user).await,
            Err(e) => self.fail(e),
        }
    }

    /// Ends the session: removes the stored token and drops cached tasks.
    ///
    /// The board is signed out even if the token file cannot be removed.
    ///
    /// # Errors
    ///
    /// The token store failed to clear.
    pub fn logout(&mut self) -> Result<()> {
        self.auth = AuthState::Unauthenticated;
        self.tasks.clear();
        self.error = None;
        info!("Signed out");

        if let Err(e) = self.client.tokens().clear() {
            warn!(error = %e, "Failed to remove session token");
            return self.fail(e);
        }
        Ok(())
    }

    async fn start_session(&mut self, token: SessionToken, user: User) -> Result<User> {
        if let Err(e) = self.client.tokens().save(&token) {
            warn!(error = %e, "Failed to store session token");
            return self.fail(e);
        }

        info!(user_id = %user.id, "Signed in");
        self.auth = AuthState::Authenticated(user.clone());
        // A failed fetch is recorded in `error`; the sign-in itself succeeded.
        let _ = self.refresh().await;
        Ok(user)
    }

    // ==================== tasks ====================

    /// Re-fetches the task list and replaces the cache.
    ///
    /// On failure the cache keeps its previous contents.
    ///
    /// # Errors
    ///
    /// Not signed in, or the fetch failed.
    pub async fn refresh(&mut self) -> Result<()> {
        self.ensure_authenticated()?;

        match self.client.list_tasks().await {
            Ok(tasks) => {
                self.tasks.replace_all(tasks);
                debug!(count = self.tasks.len(), "Tasks refreshed");
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Creates a task and appends it to the cache.
    ///
    /// The title is trimmed and must not be empty. A blank description is
    /// sent as absent.
    ///
    /// # Errors
    ///
    /// Empty title, not signed in, or the server rejected the task.
    pub async fn create_task(&mut self, mut new_task: NewTask) -> Result<Task> {
        self.ensure_authenticated()?;

        new_task.title = match validate_title(&new_task.title) {
            Ok(title) => title.to_string(),
            Err(e) => return self.fail(e),
        };
        new_task.description = new_task
            .description
            .filter(|description| !description.trim().is_empty());

        match self.client.create_task(&new_task).await {
            Ok(task) => {
                debug!(task_id = %task.id, "Task created");
                self.tasks.upsert(task.clone());
                Ok(task)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Applies a partial update and replaces the cached record with the
    /// server's response.
    ///
    /// A title in the patch is trimmed and must not be empty.
    ///
    /// # Errors
    ///
    /// Empty title, not signed in, or the server rejected the update.
    pub async fn update_task(&mut self, id: &str, mut patch: TaskPatch) -> Result<Task> {
        self.ensure_authenticated()?;

        if let Some(title) = patch.title.as_deref() {
            match validate_title(title) {
                Ok(trimmed) => patch.title = Some(trimmed.to_string()),
                Err(e) => return self.fail(e),
            }
        }

        match self.client.update_task(id, &patch).await {
            Ok(task) => {
                debug!(task_id = %task.id, "Task updated");
                self.tasks.upsert(task.clone());
                Ok(task)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Flips a cached task between `todo`/incomplete and `done`/complete.
    ///
    /// # Errors
    ///
    /// The task is not cached, or the update failed.
    pub async fn toggle_complete(&mut self, id: &str) -> Result<Task> {
        let patch = match self.tasks.get(id) {
            Some(task) => TaskPatch::toggle_complete(task),
            None => return self.fail(ClientError::TaskNotFound(id.to_string())),
        };
        self.update_task(id, patch).await
    }

    /// Moves a task to `status`, keeping the completion flag coupled.
    ///
    /// Any of the three statuses may be selected from any other.
    ///
    /// # Errors
    ///
    /// The update failed.
    pub async fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<Task> {
        self.update_task(id, TaskPatch::status_change(status)).await
    }

    /// Deletes a task and drops it from the cache.
    ///
    /// # Errors
    ///
    /// Not signed in, or the server reported failure. The cache is left
    /// unchanged on failure.
    pub async fn delete_task(&mut self, id: &str) -> Result<()> {
        self.ensure_authenticated()?;

        match self.client.delete_task(id).await {
            Ok(()) => {
                debug!(task_id = %id, "Task deleted");
                self.tasks.remove(id);
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    // ==================== view ====================

    /// Sets the status filter.
    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    /// Sets the free-text search term.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn filter(&self) -> &StatusFilter {
        &self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Derives the current view from the cache, filter and search term.
    #[must_use]
    pub fn view(&self) -> ViewState<'_> {
        derive_view(self.tasks.iter(), &self.filter, &self.search)
    }

    pub fn tasks(&self) -> &TaskCache {
        &self.tasks
    }

    pub fn auth_state(&self) -> &AuthState {
        &self.auth
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth, AuthState::Authenticated(_))
    }

    /// Message of the most recent failure, if not yet cleared.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn ensure_authenticated(&mut self) -> Result<()> {
        if self.is_authenticated() {
            return Ok(());
        }
        self.fail(ApiError::Auth(NOT_AUTHENTICATED.to_string()))
    }

    /// Records `err` as the current error message and returns it.
    fn fail<T>(&mut self, err: impl Into<ClientError>) -> Result<T> {
        let err = err.into();
        self.error = Some(err.to_string());
        Err(err)
    }
}
