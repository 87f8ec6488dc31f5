//! Article, comment and author entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifier::EntityId;

/// Display name used when the backend omits one.
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Author reference shown next to an article or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
}

impl Author {
    pub fn anonymous() -> Self {
        Self {
            id: String::new(),
            name: ANONYMOUS_NAME.to_string(),
            avatar: None,
        }
    }

    /// Overlay whichever fields the server supplied.
    pub fn merge(&mut self, patch: &AuthorPatch) {
        if let Some(id) = &patch.id {
            self.id = id.clone();
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(avatar) = &patch.avatar {
            self.avatar = Some(avatar.clone());
        }
    }
}

/// Author fields returned by a create acknowledgment; any may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// A top-level comment, or a reply when held in a parent's `replies`.
///
/// Replies are one level deep: a reply's own `replies` list stays empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: EntityId,
    pub author: Author,
    pub content: String,
    pub likes: u64,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    pub replies: Vec<Comment>,
}

/// Same shape as [`Comment`], owned by exactly one parent.
pub type Reply = Comment;

impl Comment {
    /// Fresh client-side comment with zero likes.
    pub fn draft(
        id: EntityId,
        author: Author,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author,
            content: content.into(),
            likes: 0,
            created_at: now,
            edited: false,
            replies: Vec::new(),
        }
    }

    pub fn find_reply_mut(&mut self, id: &EntityId) -> Option<&mut Reply> {
        self.replies.iter_mut().find(|r| &r.id == id)
    }
}

/// Engagement counters on an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub views: u64,
    pub likes: u64,
    pub dislikes: u64,
}

/// Short entry in the related-articles list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: EntityId,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
}

/// Article being viewed, with its comment tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: EntityId,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: Author,
    pub tags: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub engagement: Engagement,
    pub comments: Vec<Comment>,
}

impl Article {
    pub fn is_persisted(&self) -> bool {
        self.id.is_persisted()
    }

    pub fn find_comment(&self, id: &EntityId) -> Option<&Comment> {
        self.comments.iter().find(|c| &c.id == id)
    }

    pub fn find_comment_mut(&mut self, id: &EntityId) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| &c.id == id)
    }

    /// Look up a comment or a reply anywhere in the tree.
    pub fn find_any_mut(&mut self, id: &EntityId) -> Option<&mut Comment> {
        let top = self.comments.iter().position(|c| &c.id == id);
        if let Some(idx) = top {
            return self.comments.get_mut(idx);
        }
        self.comments.iter_mut().find_map(|c| c.find_reply_mut(id))
    }

    /// Total number of comments plus replies.
    pub fn comment_count(&self) -> usize {
        self.comments.iter().map(|c| 1 + c.replies.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str) -> Comment {
        Comment::draft(EntityId::from(id), Author::anonymous(), "body", Utc::now())
    }

    fn article() -> Article {
        let mut parent = comment("c1");
        parent.replies.push(comment("r1"));
        Article {
            id: EntityId::from("sample"),
            slug: "sample".to_string(),
            title: "Sample".to_string(),
            excerpt: String::new(),
            content: String::new(),
            author: Author::anonymous(),
            tags: Vec::new(),
            published_at: Utc::now(),
            engagement: Engagement::default(),
            comments: vec![parent, comment("c2")],
        }
    }

    #[test]
    fn test_find_any_reaches_replies() {
        let mut article = article();
        assert!(article.find_any_mut(&EntityId::from("r1")).is_some());
        assert!(article.find_any_mut(&EntityId::from("c2")).is_some());
        assert!(article.find_any_mut(&EntityId::from("nope")).is_none());
        assert!(article.find_comment(&EntityId::from("r1")).is_none());
    }

    #[test]
    fn test_comment_count_includes_replies() {
        assert_eq!(article().comment_count(), 3);
    }

    #[test]
    fn test_author_merge_only_overwrites_present_fields() {
        let mut author = Author {
            id: "u1".to_string(),
            name: "Local Name".to_string(),
            avatar: Some("local.png".to_string()),
        };
        author.merge(&AuthorPatch {
            id: None,
            name: Some("Server Name".to_string()),
            avatar: None,
        });

        assert_eq!(author.id, "u1");
        assert_eq!(author.name, "Server Name");
        assert_eq!(author.avatar.as_deref(), Some("local.png"));
    }
}
