//! HTTP client for the posts backend.
//!
//! `PostsBackend` is the seam the rest of the app talks to; `HttpBackend`
//! is the reqwest implementation. Tests swap in canned backends.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    LoginRequest, Post, PostDraft, SearchRequest, TokenRequest, is_truthy, rejection_message,
};
use crate::core::state::User;

/// Errors that can occur while talking to the backend.
#[derive(Debug)]
pub enum ApiError {
    /// Network-level failure (timeout, DNS, connection refused, bad base URL).
    Network(String),
    /// Backend returned a non-success status.
    Api { status: u16, message: String },
    /// Backend answered 200 but refused the request (validation errors).
    Rejected(String),
    /// Failed to parse the backend's response.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ApiError::Rejected(msg) => write!(f, "request rejected: {msg}"),
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[async_trait]
pub trait PostsBackend: Send + Sync {
    /// `POST /checkToken`. `Ok(false)` means the token is invalid or expired.
    async fn check_token(&self, token: &str) -> Result<bool, ApiError>;

    /// `POST /login`. `Ok(None)` means the credentials were rejected.
    async fn login(&self, username: &str, password: &str) -> Result<Option<User>, ApiError>;

    /// `GET /profile/:username/posts`.
    async fn profile_posts(&self, username: &str) -> Result<Vec<Post>, ApiError>;

    /// `POST /getHomeFeed`: posts from the accounts the user follows.
    async fn home_feed(&self, token: &str) -> Result<Vec<Post>, ApiError>;

    /// `POST /search`.
    async fn search(&self, term: &str) -> Result<Vec<Post>, ApiError>;

    /// `GET /post/:id`.
    async fn post(&self, id: &str) -> Result<Post, ApiError>;

    /// `POST /create-post`. Returns the id of the new post.
    async fn create_post(&self, title: &str, body: &str, token: &str) -> Result<String, ApiError>;

    /// `POST /post/:id/edit`.
    async fn edit_post(&self, id: &str, title: &str, body: &str, token: &str)
    -> Result<(), ApiError>;
}

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout ({}), using defaults", e);
                reqwest::Client::new()
            });
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Network(format!("invalid backend URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Network(format!("backend URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("GET {}", url.path());
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("POST {}", url.path());
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("Backend error: {} - {}", status.as_u16(), message);
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

#[async_trait]
impl PostsBackend for HttpBackend {
    async fn check_token(&self, token: &str) -> Result<bool, ApiError> {
        let value: serde_json::Value = self
            .post_json(&["checkToken"], &TokenRequest { token })
            .await?;
        let valid = is_truthy(&value);
        info!("Token check: valid={}", valid);
        Ok(valid)
    }

    async fn login(&self, username: &str, password: &str) -> Result<Option<User>, ApiError> {
        let value: serde_json::Value = self
            .post_json(&["login"], &LoginRequest { username, password })
            .await?;
        if !is_truthy(&value) {
            info!("Login rejected for {}", username);
            return Ok(None);
        }
        let user: User =
            serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))?;
        info!("Logged in as {}", user.username);
        Ok(Some(user))
    }

    async fn profile_posts(&self, username: &str) -> Result<Vec<Post>, ApiError> {
        let posts: Vec<Post> = self.get_json(&["profile", username, "posts"]).await?;
        debug!("Fetched {} posts for {}", posts.len(), username);
        Ok(posts)
    }

    async fn home_feed(&self, token: &str) -> Result<Vec<Post>, ApiError> {
        self.post_json(&["getHomeFeed"], &TokenRequest { token }).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Post>, ApiError> {
        let posts: Vec<Post> = self
            .post_json(&["search"], &SearchRequest { search_term: term })
            .await?;
        debug!("Search '{}' returned {} posts", term, posts.len());
        Ok(posts)
    }

    async fn post(&self, id: &str) -> Result<Post, ApiError> {
        self.get_json(&["post", id]).await
    }

    async fn create_post(&self, title: &str, body: &str, token: &str) -> Result<String, ApiError> {
        let value: serde_json::Value = self
            .post_json(&["create-post"], &PostDraft { title, body, token })
            .await?;
        // The new id on success, a list of validation errors otherwise
        match value {
            serde_json::Value::String(id) if !id.is_empty() => {
                info!("Created post {}", id);
                Ok(id)
            }
            other => Err(ApiError::Rejected(rejection_message(&other))),
        }
    }

    async fn edit_post(
        &self,
        id: &str,
        title: &str,
        body: &str,
        token: &str,
    ) -> Result<(), ApiError> {
        let value: serde_json::Value = self
            .post_json(&["post", id, "edit"], &PostDraft { title, body, token })
            .await?;
        if value.as_str() == Some("success") {
            info!("Updated post {}", id);
            Ok(())
        } else {
            Err(ApiError::Rejected(rejection_message(&value)))
        }
    }
}
