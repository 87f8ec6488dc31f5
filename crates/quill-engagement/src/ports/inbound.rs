//! Driving Ports (API - Inbound)
//!
//! Handlers the page shell binds to its controls. Every handler mutates local
//! state synchronously and returns; backend work happens in the background.

use crate::domain::{Article, EntityId, Reaction};

/// Why a handler refused to act.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// Comment or reply text was empty or whitespace
    EmptyContent,
    /// No article has been loaded yet
    NotLoaded,
    /// Target comment is not in the tree
    UnknownComment,
    /// This page view was already counted
    AlreadyCounted,
}

/// Result of a handler invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Local state changed. `id` is the handle of a created comment/reply.
    Applied { id: Option<EntityId> },
    /// No session; the login prompt is now showing
    LoginRequired,
    /// Nothing changed
    Rejected(RejectReason),
}

impl ActionOutcome {
    pub fn applied() -> Self {
        ActionOutcome::Applied { id: None }
    }

    pub fn created(id: EntityId) -> Self {
        ActionOutcome::Applied { id: Some(id) }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied { .. })
    }

    /// Identifier of the created entity, if any.
    pub fn created_id(&self) -> Option<&EntityId> {
        match self {
            ActionOutcome::Applied { id } => id.as_ref(),
            _ => None,
        }
    }
}

/// Primary page API.
pub trait EngagementApi {
    fn toggle_like(&self) -> ActionOutcome;

    fn toggle_dislike(&self) -> ActionOutcome;

    /// Submit a top-level comment; clears the comment draft when applied.
    fn submit_comment(&self, text: &str) -> ActionOutcome;

    /// Submit a reply under `comment_id`; closes the reply form when applied.
    fn submit_reply(&self, comment_id: &EntityId, text: &str) -> ActionOutcome;

    fn like_comment(&self, comment_id: &EntityId) -> ActionOutcome;

    /// Bump the view counter. Only the first call per page view counts.
    fn increment_view_count(&self) -> ActionOutcome;

    /// Copy of the article for rendering.
    fn snapshot(&self) -> Option<Article>;

    fn reaction(&self) -> Reaction;

    fn login_prompt_visible(&self) -> bool;

    fn dismiss_login_prompt(&self);
}
