//! # quill-engagement
//!
//! Optimistic comment, reply and reaction synchronisation for a blog
//! article page.
//!
//! ## Overview
//!
//! - **Optimistic updates**: every handler changes the local article
//!   immediately, before any backend round trip
//! - **Reconciliation**: client-created comments carry a temporary id
//!   (`temp-…` / `reply-…`) until the backend acknowledges them with a real one
//! - **Local-only content**: only 24-hex-character identifiers are ever sent
//!   to the backend; sample content stays on the client
//! - **Optimistic forever**: sync failures are logged, never rolled back
//!
//! ## Architecture
//!
//! ```text
//! page shell ──EngagementApi──→ ArticlePage ──BlogBackend──→ REST backend
//!                                   │
//!                                   └──SessionProvider──→ StoredSession
//!                                                            └──→ PreferenceStore
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quill_engagement::prelude::*;
//!
//! let config = EngagementConfig::from_env();
//! let store = Arc::new(InMemoryPreferenceStore::new());
//! let session = Arc::new(StoredSession::new(store));
//! let backend = Arc::new(HttpBlogBackend::new(&config)?.with_session(session.clone()));
//!
//! let page = ArticlePage::new(&config, backend, session);
//! page.load("building-ai-applications-openai-gpt4-langchain").await;
//! page.submit_comment("Great article!");
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use config::EngagementConfig;
pub use domain::{
    Article, ArticleSummary, Author, Comment, Engagement, EntityId, Reaction, ReactionKind, Reply,
};
pub use error::{EngagementError, EngagementResult};
pub use ports::{ActionOutcome, EngagementApi, RejectReason};
pub use service::{ArticlePage, ArticleSource, ReplyForm};

/// Everything a page shell needs.
pub mod prelude {
    pub use crate::adapters::{
        HttpBlogBackend, InMemoryPreferenceStore, JsonFilePreferenceStore, StoredSession,
    };
    pub use crate::config::EngagementConfig;
    pub use crate::domain::{Article, Comment, EntityId, Reaction};
    pub use crate::ports::{
        ActionOutcome, BlogBackend, EngagementApi, PreferenceStore, RejectReason,
        SessionProvider, Viewer,
    };
    pub use crate::service::{ArticlePage, ArticleSource};
}
