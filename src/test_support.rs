//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiError, Author, Post, PostsBackend};
use crate::core::action::{Action, update};
use crate::core::state::{SessionState, User};

/// A canned backend for tests that don't need real HTTP calls.
pub struct StaticBackend {
    pub token_valid: bool,
    pub user: Option<User>,
    pub posts: Vec<Post>,
    /// Applied before every answer, to leave room for cancellation.
    pub delay: Duration,
    /// Id handed out by `create_post`.
    pub created_id: String,
    /// When set, `create_post` and `edit_post` are refused with this message.
    pub reject_drafts: Option<String>,
}

impl Default for StaticBackend {
    fn default() -> Self {
        Self {
            token_valid: true,
            user: None,
            posts: Vec::new(),
            delay: Duration::ZERO,
            created_id: "new-post".to_string(),
            reject_drafts: None,
        }
    }
}

impl StaticBackend {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn check_draft(&self) -> Result<(), ApiError> {
        match &self.reject_drafts {
            Some(message) => Err(ApiError::Rejected(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PostsBackend for StaticBackend {
    async fn check_token(&self, _token: &str) -> Result<bool, ApiError> {
        self.pause().await;
        Ok(self.token_valid)
    }

    async fn login(&self, _username: &str, _password: &str) -> Result<Option<User>, ApiError> {
        self.pause().await;
        Ok(self.user.clone())
    }

    async fn profile_posts(&self, username: &str) -> Result<Vec<Post>, ApiError> {
        self.pause().await;
        Ok(self
            .posts
            .iter()
            .filter(|p| p.author.username == username)
            .cloned()
            .collect())
    }

    async fn home_feed(&self, _token: &str) -> Result<Vec<Post>, ApiError> {
        self.pause().await;
        Ok(self.posts.clone())
    }

    async fn search(&self, term: &str) -> Result<Vec<Post>, ApiError> {
        self.pause().await;
        Ok(self
            .posts
            .iter()
            .filter(|p| p.title.contains(term) || p.body.contains(term))
            .cloned()
            .collect())
    }

    async fn post(&self, id: &str) -> Result<Post, ApiError> {
        self.pause().await;
        self.posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Api {
                status: 404,
                message: format!("no post {id}"),
            })
    }

    async fn create_post(&self, _title: &str, _body: &str, _token: &str) -> Result<String, ApiError> {
        self.pause().await;
        self.check_draft()?;
        Ok(self.created_id.clone())
    }

    async fn edit_post(
        &self,
        _id: &str,
        _title: &str,
        _body: &str,
        _token: &str,
    ) -> Result<(), ApiError> {
        self.pause().await;
        self.check_draft()
    }
}

/// Builds a post authored by `username`.
pub fn sample_post(id: &str, title: &str, username: &str) -> Post {
    Post {
        id: id.to_string(),
        title: title.to_string(),
        body: format!("Body of {title}"),
        created_date: None,
        author: Author {
            username: username.to_string(),
            avatar: String::new(),
        },
    }
}

/// A session signed in as `brad`.
pub fn logged_in_state() -> SessionState {
    update(
        SessionState::default(),
        Action::Login(User::new("brad", "avatar.png", "token-123")),
    )
}
