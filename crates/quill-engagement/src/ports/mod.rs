//! Hexagonal ports for the article page.

pub mod inbound;
pub mod outbound;

pub use inbound::{ActionOutcome, EngagementApi, RejectReason};
pub use outbound::{
    ArticleBundle, BlogBackend, CreatedComment, NewComment, PreferenceStore, SessionProvider,
    Viewer,
};
