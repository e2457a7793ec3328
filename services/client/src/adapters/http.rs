//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation
//! of the `SessionApi` and `CatalogApi` ports. It talks JSON to the remote REST
//! API using `reqwest` and attaches the stored bearer token to outgoing requests.
//!
//! No timeout and no retry are configured: failures propagate to the caller as a
//! `PortError` and the caller decides what to tell the user.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use study_notes_core::domain::{
    AnalyticsEvent, CompleteProfileRequest, Domain, Note, SignInRequest, SignInResponse,
    SignUpRequest, Subject, User,
};
use study_notes_core::ports::{CatalogApi, PortError, PortResult, SessionApi};
use tracing::debug;

use crate::session::TokenStore;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Whether a request carries the stored bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Anonymous,
    Bearer,
}

/// An adapter that implements the remote API ports over HTTP.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    tokens: TokenStore,
}

impl HttpApi {
    /// Creates a new `HttpApi` rooted at `base_url` (e.g. `https://host/api`).
    pub fn new(client: Client, base_url: impl Into<String>, tokens: TokenStore) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            tokens,
        }
    }

    /// Joins `segments` onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> PortResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PortError::Unexpected(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PortError::Unexpected("Base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Starts a request. The token slot is read here, right before sending.
    fn request(&self, method: Method, url: Url, auth: Auth) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match (auth, self.tokens.get()) {
            (Auth::Bearer, Some(token)) => builder.bearer_auth(token),
            _ => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> PortResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(%status, "Remote API refused request");
        Err(status_to_error(status, body))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> PortResult<T> {
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(format!("Malformed response body: {}", e)))
    }
}

/// Maps a non-success status and its body onto the port error taxonomy.
fn status_to_error(status: StatusCode, body: String) -> PortError {
    let message = body.trim();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound(if message.is_empty() {
            "Resource not found".to_string()
        } else {
            message.to_string()
        }),
        s if s.is_client_error() => PortError::Rejected(if message.is_empty() {
            format!("Request rejected ({})", s)
        } else {
            message.to_string()
        }),
        s => PortError::Unexpected(format!("Server error ({}): {}", s, message)),
    }
}

//=========================================================================================
// `SessionApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionApi for HttpApi {
    async fn sign_up(&self, request: &SignUpRequest) -> PortResult<()> {
        let url = self.endpoint(&["auth", "signup"])?;
        let builder = self.request(Method::POST, url, Auth::Anonymous).json(request);
        self.send(builder).await?;
        Ok(())
    }

    async fn sign_in(&self, request: &SignInRequest) -> PortResult<SignInResponse> {
        let url = self.endpoint(&["auth", "signin"])?;
        let builder = self.request(Method::POST, url, Auth::Anonymous).json(request);
        self.send_json(builder).await
    }

    async fn fetch_profile(&self) -> PortResult<User> {
        let url = self.endpoint(&["user", "profile"])?;
        let builder = self.request(Method::GET, url, Auth::Bearer);
        self.send_json(builder).await
    }

    async fn complete_profile(&self, request: &CompleteProfileRequest) -> PortResult<User> {
        let url = self.endpoint(&["user", "complete-profile"])?;
        let builder = self.request(Method::POST, url, Auth::Bearer).json(request);
        self.send_json(builder).await
    }

    async fn upgrade_to_premium(&self) -> PortResult<()> {
        let url = self.endpoint(&["user", "premium"])?;
        let builder = self.request(Method::PUT, url, Auth::Bearer);
        self.send(builder).await?;
        Ok(())
    }

    async fn track(&self, event: &AnalyticsEvent) -> PortResult<()> {
        let url = self.endpoint(&["analytics", "track"])?;
        let builder = self.request(Method::POST, url, Auth::Bearer).json(event);
        self.send(builder).await?;
        Ok(())
    }
}

//=========================================================================================
// `CatalogApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogApi for HttpApi {
    async fn list_domains(&self) -> PortResult<Vec<Domain>> {
        let url = self.endpoint(&["domains"])?;
        let builder = self.request(Method::GET, url, Auth::Bearer);
        self.send_json(builder).await
    }

    async fn list_subjects(&self, domain_id: &str) -> PortResult<Vec<Subject>> {
        let url = self.endpoint(&["subjects", "domain", domain_id])?;
        let builder = self.request(Method::GET, url, Auth::Bearer);
        self.send_json(builder).await
    }

    async fn list_notes(&self, subject_id: &str) -> PortResult<Vec<Note>> {
        let url = self.endpoint(&["notes", "subject", subject_id])?;
        let builder = self.request(Method::GET, url, Auth::Bearer);
        self.send_json(builder).await
    }
}
