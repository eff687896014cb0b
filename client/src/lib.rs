//! Taskdeck - Kanban task board client.
//!
//! This crate talks to a remote task API over HTTP and presents the signed-in
//! user's tasks as a three-column board (To Do, In Progress, Done).
//!
//! # Overview
//!
//! The remote API owns every task and account. The client keeps a bearer
//! token in a [`TokenStore`], mirrors the task list in a [`TaskCache`], and
//! derives what is shown from the cache, a status filter and a search term.
//!
//! # Modules
//!
//! - [`api`]: HTTP client for the auth and task endpoints, with error normalization
//! - [`session`]: Bearer token type and durable token storage
//! - [`cache`]: Identifier-keyed, order-preserving task cache
//! - [`view`]: Pure filter, search and column grouping
//! - [`board`]: Controller tying session, cache and view together
//! - [`validation`]: Form input checks run before any request
//! - [`types`]: Wire types for tasks, users and request bodies
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error types for client operations
//! - [`tui`]: Interactive board in the terminal

pub mod api;
pub mod board;
pub mod cache;
pub mod config;
pub mod error;
pub mod session;
pub mod tui;
pub mod types;
pub mod validation;
pub mod view;

pub use api::{ApiClient, ApiError};
pub use board::{AuthState, Board};
pub use cache::TaskCache;
pub use config::Config;
pub use error::{ClientError, Result};
pub use session::{FileTokenStore, MemoryTokenStore, SessionToken, TokenStore};
pub use types::{Column, NewTask, Priority, Task, TaskPatch, TaskStatus, User};
pub use validation::ValidationError;
pub use view::{derive_view, StatusFilter, ViewState};
