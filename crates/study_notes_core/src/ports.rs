//! crates/study_notes_core/src/ports.rs
//!
//! Defines the service contracts (traits) the session logic depends on.
//! These traits form the boundary of the hexagonal architecture: the core never
//! knows whether storage is a directory on disk or an in-memory map, or whether
//! the remote API is reached over HTTP or a test double.

use async_trait::async_trait;
use crate::domain::{
    AnalyticsEvent, CompleteProfileRequest, Domain, Note, SignInRequest, SignInResponse,
    SignUpRequest, Subject, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (storage, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The server refused the request and said why (a 4xx with a message body).
    #[error("{0}")]
    Rejected(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Local Ports
//=========================================================================================

/// A string key/value store with the semantics of browser local storage.
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> PortResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> PortResult<()>;
    /// Removing a key that does not exist is not an error.
    fn remove_item(&self, key: &str) -> PortResult<()>;
}

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// How serious a user-facing notice is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the user (the toast of the browser client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

//=========================================================================================
// Remote Ports
//=========================================================================================

#[async_trait]
pub trait SessionApi: Send + Sync {
    // --- Auth ---
    /// Registers an account. No token is issued.
    async fn sign_up(&self, request: &SignUpRequest) -> PortResult<()>;

    async fn sign_in(&self, request: &SignInRequest) -> PortResult<SignInResponse>;

    // --- Profile ---
    async fn fetch_profile(&self) -> PortResult<User>;

    async fn complete_profile(&self, request: &CompleteProfileRequest) -> PortResult<User>;

    async fn upgrade_to_premium(&self) -> PortResult<()>;

    // --- Analytics ---
    async fn track(&self, event: &AnalyticsEvent) -> PortResult<()>;
}

/// Read-only access to the domain -> subject -> note browsing tree.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_domains(&self) -> PortResult<Vec<Domain>>;

    async fn list_subjects(&self, domain_id: &str) -> PortResult<Vec<Subject>>;

    async fn list_notes(&self, subject_id: &str) -> PortResult<Vec<Note>>;
}
