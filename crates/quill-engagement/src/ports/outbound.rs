//! Driven Ports (SPI - Outbound Dependencies)
//!
//! The page depends on three collaborators: the REST backend, the session
//! capability, and a key-value preference store backing the session.

use async_trait::async_trait;

use crate::domain::{Article, ArticleSummary, AuthorPatch, Comment, EntityId};
use crate::error::EngagementResult;

/// Article detail response: the article plus its related list.
#[derive(Clone, Debug)]
pub struct ArticleBundle {
    pub article: Article,
    pub related: Vec<ArticleSummary>,
}

/// Body of `POST /blog/comments`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewComment {
    pub article: EntityId,
    pub content: String,
    /// `None` for a top-level comment
    pub parent: Option<EntityId>,
}

/// Create acknowledgment. Every field is optional; a missing `id` means no
/// reconciliation happens.
#[derive(Clone, Debug, Default)]
pub struct CreatedComment {
    pub id: Option<EntityId>,
    pub author: Option<AuthorPatch>,
}

/// REST backend for articles and comments.
///
/// Callers only pass persisted identifiers.
#[async_trait]
pub trait BlogBackend: Send + Sync {
    /// `GET /blog/articles/{slug}`; `Ok(None)` when the article does not exist.
    async fn fetch_article(&self, slug: &str) -> EngagementResult<Option<ArticleBundle>>;

    /// `POST /blog/articles/{id}/view`
    async fn record_view(&self, article_id: &EntityId) -> EngagementResult<()>;

    /// `POST /blog/articles/{id}/like`
    async fn toggle_article_like(&self, article_id: &EntityId) -> EngagementResult<()>;

    /// `GET /blog/articles/{id}/comments`
    async fn fetch_comments(&self, article_id: &EntityId) -> EngagementResult<Vec<Comment>>;

    /// `POST /blog/comments`
    async fn create_comment(&self, request: &NewComment) -> EngagementResult<CreatedComment>;

    /// `POST /blog/comments/{id}/like`
    async fn like_comment(&self, comment_id: &EntityId) -> EngagementResult<()>;
}

/// Signed-in viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Viewer {
    pub id: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub access_token: String,
}

/// Authentication capability check.
pub trait SessionProvider: Send + Sync {
    /// The active viewer, or `None` when nobody is signed in.
    fn current_viewer(&self) -> Option<Viewer>;

    fn is_authenticated(&self) -> bool {
        self.current_viewer().is_some()
    }
}

/// Key-value preference persistence (access token, viewer profile).
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> EngagementResult<()>;

    fn remove(&self, key: &str) -> EngagementResult<()>;
}
