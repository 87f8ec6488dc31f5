//! Domain model for article engagement.

pub mod entities;
pub mod identifier;
pub mod reaction;
pub mod sample;

pub use entities::{
    Article, ArticleSummary, Author, AuthorPatch, Comment, Engagement, Reply, ANONYMOUS_NAME,
};
pub use identifier::{is_persisted_id, EntityId, TempIdGenerator, TempIdKind, PERSISTED_ID_LEN};
pub use reaction::{Reaction, ReactionKind};
pub use sample::{sample_article, sample_related, SAMPLE_SLUG};
