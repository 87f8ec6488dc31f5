//! JSON wire types for the blog backend.
//!
//! Every field is optional on the wire. Missing values are substituted
//! here, in one place, when converting into domain entities:
//!
//! | Field | Substitute |
//! |-------|------------|
//! | article id | requested slug |
//! | slug | requested slug |
//! | title | `"Untitled"` |
//! | content, excerpt | empty |
//! | counters | `0` |
//! | lists | empty |
//! | author / author name | `"Anonymous"` |
//! | timestamps | decode time |
//! | edited flag | `false` |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Article, ArticleSummary, Author, AuthorPatch, Comment, EntityId, Engagement, ANONYMOUS_NAME,
};
use crate::ports::{CreatedComment, NewComment};

pub const UNTITLED: &str = "Untitled";

/// Optional `{"data": ...}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

/// Author object, or just the author's id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiAuthorRef {
    Object(ApiAuthor),
    Id(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiAuthor {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, alias = "username", alias = "displayName")]
    pub name: Option<String>,
    #[serde(default, alias = "avatarUrl", alias = "profileImage")]
    pub avatar: Option<String>,
}

/// A counter sent either as a number or as the list of users behind it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiCount {
    Number(u64),
    List(Vec<serde_json::Value>),
}

impl ApiCount {
    pub fn value(&self) -> u64 {
        match self {
            ApiCount::Number(n) => *n,
            ApiCount::List(items) => items.len() as u64,
        }
    }
}

fn count(value: &Option<ApiCount>) -> u64 {
    value.as_ref().map(ApiCount::value).unwrap_or(0)
}

fn timestamp(value: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiComment {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, alias = "user")]
    pub author: Option<ApiAuthorRef>,
    #[serde(default, alias = "text", alias = "body")]
    pub content: Option<String>,
    #[serde(default)]
    pub likes: Option<ApiCount>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, alias = "edited")]
    pub is_edited: Option<bool>,
    #[serde(default)]
    pub replies: Vec<ApiComment>,
}

impl ApiAuthorRef {
    fn into_author(self) -> Author {
        match self {
            ApiAuthorRef::Object(author) => Author {
                id: author.id.unwrap_or_default(),
                name: non_empty(author.name).unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
                avatar: non_empty(author.avatar),
            },
            ApiAuthorRef::Id(id) => Author {
                id,
                name: ANONYMOUS_NAME.to_string(),
                avatar: None,
            },
        }
    }

    /// Only the fields the server actually sent.
    fn into_patch(self) -> AuthorPatch {
        match self {
            ApiAuthorRef::Object(author) => AuthorPatch {
                id: non_empty(author.id),
                name: non_empty(author.name),
                avatar: non_empty(author.avatar),
            },
            ApiAuthorRef::Id(id) => AuthorPatch {
                id: non_empty(Some(id)),
                ..AuthorPatch::default()
            },
        }
    }
}

impl ApiComment {
    /// Convert a top-level comment. Replies nested deeper than one level are
    /// flattened into the parent's reply list, depth-first.
    pub fn into_domain(mut self, now: DateTime<Utc>) -> Comment {
        let mut flat = Vec::new();
        for reply in std::mem::take(&mut self.replies) {
            flatten_reply(reply, now, &mut flat);
        }

        let mut comment = self.into_leaf(now);
        comment.replies = flat;
        comment
    }

    fn into_leaf(self, now: DateTime<Utc>) -> Comment {
        Comment {
            id: EntityId::new(self.id.unwrap_or_default()),
            author: self
                .author
                .map(ApiAuthorRef::into_author)
                .unwrap_or_else(Author::anonymous),
            content: self.content.unwrap_or_default(),
            likes: count(&self.likes),
            created_at: timestamp(self.created_at.as_deref(), now),
            edited: self.is_edited.unwrap_or(false),
            replies: Vec::new(),
        }
    }
}

fn flatten_reply(mut reply: ApiComment, now: DateTime<Utc>, out: &mut Vec<Comment>) {
    let nested = std::mem::take(&mut reply.replies);
    out.push(reply.into_leaf(now));
    for child in nested {
        flatten_reply(child, now, out);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticleSummary {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

impl ApiArticleSummary {
    pub fn into_domain(self) -> ArticleSummary {
        let slug = self.slug.unwrap_or_default();
        ArticleSummary {
            id: EntityId::new(self.id.unwrap_or_else(|| slug.clone())),
            slug,
            title: non_empty(self.title).unwrap_or_else(|| UNTITLED.to_string()),
            excerpt: self.excerpt.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticle {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<ApiAuthorRef>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "createdAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub views: Option<ApiCount>,
    #[serde(default)]
    pub likes: Option<ApiCount>,
    #[serde(default)]
    pub dislikes: Option<ApiCount>,
    #[serde(default)]
    pub comments: Vec<ApiComment>,
}

impl ApiArticle {
    /// Whether the body identifies an article at all.
    ///
    /// Every field defaults, so any JSON object decodes; an error body such as
    /// `{"success": false, "message": "..."}` must not become a blank article.
    pub fn is_present(&self) -> bool {
        [&self.id, &self.slug, &self.title]
            .into_iter()
            .any(|field| field.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    pub fn into_domain(self, requested_slug: &str, now: DateTime<Utc>) -> Article {
        let slug = non_empty(self.slug).unwrap_or_else(|| requested_slug.to_string());
        let id = non_empty(self.id).unwrap_or_else(|| requested_slug.to_string());

        Article {
            id: EntityId::new(id),
            slug,
            title: non_empty(self.title).unwrap_or_else(|| UNTITLED.to_string()),
            excerpt: self.excerpt.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            author: self
                .author
                .map(ApiAuthorRef::into_author)
                .unwrap_or_else(Author::anonymous),
            tags: self.tags,
            published_at: timestamp(self.published_at.as_deref(), now),
            engagement: Engagement {
                views: count(&self.views),
                likes: count(&self.likes),
                dislikes: count(&self.dislikes),
            },
            comments: self
                .comments
                .into_iter()
                .map(|c| c.into_domain(now))
                .collect(),
        }
    }
}

/// Body of `GET /blog/articles/{slug}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ArticleDetailBody {
    Detail {
        article: ApiArticle,
        #[serde(default, alias = "relatedArticles")]
        related: Vec<ApiArticleSummary>,
    },
    Bare(ApiArticle),
}

impl ArticleDetailBody {
    pub fn into_parts(self) -> (ApiArticle, Vec<ApiArticleSummary>) {
        match self {
            ArticleDetailBody::Detail { article, related } => (article, related),
            ArticleDetailBody::Bare(article) => (article, Vec::new()),
        }
    }
}

/// Body of `GET /blog/articles/{id}/comments`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CommentsBody {
    Wrapped { comments: Vec<ApiComment> },
    Bare(Vec<ApiComment>),
}

impl CommentsBody {
    pub fn into_comments(self) -> Vec<ApiComment> {
        match self {
            CommentsBody::Wrapped { comments } => comments,
            CommentsBody::Bare(comments) => comments,
        }
    }
}

/// Body of `POST /blog/comments` responses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreatedBody {
    Wrapped { comment: ApiComment },
    Bare(ApiComment),
}

impl CreatedBody {
    pub fn into_created(self) -> CreatedComment {
        let comment = match self {
            CreatedBody::Wrapped { comment } => comment,
            CreatedBody::Bare(comment) => comment,
        };

        CreatedComment {
            id: non_empty(comment.id).map(EntityId::new),
            author: comment.author.map(ApiAuthorRef::into_patch),
        }
    }
}

/// Request body of `POST /blog/comments`.
#[derive(Debug, Serialize)]
pub struct NewCommentBody<'a> {
    pub article: &'a str,
    pub content: &'a str,
    pub parent: Option<&'a str>,
}

impl<'a> From<&'a NewComment> for NewCommentBody<'a> {
    fn from(request: &'a NewComment) -> Self {
        Self {
            article: request.article.as_str(),
            content: &request.content,
            parent: request.parent.as_ref().map(EntityId::as_str),
        }
    }
}
