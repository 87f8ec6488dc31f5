//! Entity identifiers and temporary-id generation.
//!
//! An identifier is either *persisted* (exactly 24 hex characters, the shape
//! of a backend object id) or *local-only* (sample slugs, temporary ids).
//! Backend calls are only ever made for persisted identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Length of a backend object identifier.
pub const PERSISTED_ID_LEN: usize = 24;

/// Identifier of an article, comment or reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the backend knows this entity.
    pub fn is_persisted(&self) -> bool {
        is_persisted_id(&self.0)
    }

    /// True for identifiers minted by [`TempIdGenerator`].
    pub fn is_temporary(&self) -> bool {
        TempIdKind::ALL.iter().any(|kind| {
            self.0
                .strip_prefix(kind.prefix())
                .is_some_and(|rest| rest.starts_with('-'))
        })
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Classify a raw identifier: exactly 24 ASCII hex digits.
pub fn is_persisted_id(id: &str) -> bool {
    id.len() == PERSISTED_ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Kind of client-created entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempIdKind {
    Comment,
    Reply,
}

impl TempIdKind {
    pub const ALL: [TempIdKind; 2] = [TempIdKind::Comment, TempIdKind::Reply];

    pub fn prefix(&self) -> &'static str {
        match self {
            TempIdKind::Comment => "temp",
            TempIdKind::Reply => "reply",
        }
    }
}

/// Mints `temp-<millis>-<seq>` / `reply-<millis>-<seq>` identifiers.
///
/// The sequence number is monotonic per generator, so two creations in the
/// same millisecond never collide.
#[derive(Debug, Default)]
pub struct TempIdGenerator {
    seq: AtomicU64,
}

impl TempIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, kind: TempIdKind) -> EntityId {
        self.next_at(kind, chrono::Utc::now().timestamp_millis())
    }

    /// Mint an identifier for an explicit timestamp.
    pub fn next_at(&self, kind: TempIdKind, millis: i64) -> EntityId {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        EntityId(format!("{}-{}-{}", kind.prefix(), millis, seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_id_classification() {
        assert!(is_persisted_id("507f1f77bcf86cd799439011"));
        assert!(is_persisted_id("507F1F77BCF86CD799439011"));
        assert!(!is_persisted_id("building-ai-applications-openai-gpt4-langchain"));
        assert!(!is_persisted_id("507f1f77bcf86cd79943901"));
        assert!(!is_persisted_id("507f1f77bcf86cd7994390111"));
        assert!(!is_persisted_id("507f1f77bcf86cd79943901g"));
        assert!(!is_persisted_id(""));
    }

    #[test]
    fn test_non_ascii_is_local_only() {
        // 24 bytes but not 24 hex digits
        assert!(!is_persisted_id("ééééééééééëë"));
    }

    #[test]
    fn test_temp_ids_are_local_only() {
        let ids = TempIdGenerator::new();
        let comment = ids.next(TempIdKind::Comment);
        let reply = ids.next(TempIdKind::Reply);

        assert!(comment.as_str().starts_with("temp-"));
        assert!(reply.as_str().starts_with("reply-"));
        assert!(!comment.is_persisted());
        assert!(comment.is_temporary());
        assert!(reply.is_temporary());
        assert!(!EntityId::from("c1").is_temporary());
    }

    #[test]
    fn test_same_millisecond_does_not_collide() {
        let ids = TempIdGenerator::new();
        let a = ids.next_at(TempIdKind::Comment, 1_700_000_000_000);
        let b = ids.next_at(TempIdKind::Comment, 1_700_000_000_000);
        assert_ne!(a, b);
    }
}
