//! Adapters for the outbound ports.

pub mod http_backend;
pub mod preferences;
pub mod session;
pub mod wire;

pub use http_backend::HttpBlogBackend;
pub use preferences::{InMemoryPreferenceStore, JsonFilePreferenceStore};
pub use session::{StoredSession, TOKEN_KEY, USER_KEY};
