//! Session backed by a [`PreferenceStore`].
//!
//! The access token lives under [`TOKEN_KEY`] and the viewer profile, as
//! JSON, under [`USER_KEY`]. A token without a readable profile still counts
//! as signed in.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::ANONYMOUS_NAME;
use crate::error::{EngagementError, EngagementResult};
use crate::ports::{PreferenceStore, SessionProvider, Viewer};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Serialize, Deserialize)]
struct StoredProfile {
    #[serde(default, alias = "_id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    avatar: Option<String>,
}

/// Session capability reading token and profile from a preference store.
pub struct StoredSession<P: PreferenceStore> {
    store: Arc<P>,
}

impl<P: PreferenceStore> StoredSession<P> {
    pub fn new(store: Arc<P>) -> Self {
        Self { store }
    }

    /// Persist a signed-in viewer.
    pub fn sign_in(&self, viewer: &Viewer) -> EngagementResult<()> {
        let profile = StoredProfile {
            id: viewer.id.clone(),
            name: viewer.display_name.clone(),
            avatar: viewer.avatar.clone(),
        };
        let json =
            serde_json::to_string(&profile).map_err(|e| EngagementError::Decode(e.to_string()))?;

        self.store.set(TOKEN_KEY, &viewer.access_token)?;
        self.store.set(USER_KEY, &json)?;
        tracing::debug!(viewer = %viewer.id, "Session stored");
        Ok(())
    }

    pub fn sign_out(&self) -> EngagementResult<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)
    }
}

impl<P: PreferenceStore> SessionProvider for StoredSession<P> {
    fn current_viewer(&self) -> Option<Viewer> {
        let token = self.store.get(TOKEN_KEY).filter(|t| !t.trim().is_empty())?;

        let profile = self
            .store
            .get(USER_KEY)
            .and_then(|raw| match serde_json::from_str::<StoredProfile>(&raw) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unreadable stored profile");
                    None
                }
            });

        let (id, name, avatar) = match profile {
            Some(p) => (p.id, p.name, p.avatar),
            None => (String::new(), String::new(), None),
        };

        Some(Viewer {
            id,
            display_name: if name.trim().is_empty() {
                ANONYMOUS_NAME.to_string()
            } else {
                name
            },
            avatar,
            access_token: token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryPreferenceStore;

    fn viewer() -> Viewer {
        Viewer {
            id: "u1".to_string(),
            display_name: "Ada".to_string(),
            avatar: Some("ada.png".to_string()),
            access_token: "tok".to_string(),
        }
    }

    #[test]
    fn test_sign_in_then_out() {
        let session = StoredSession::new(Arc::new(InMemoryPreferenceStore::new()));
        assert!(!session.is_authenticated());

        session.sign_in(&viewer()).unwrap();
        assert_eq!(session.current_viewer(), Some(viewer()));

        session.sign_out().unwrap();
        assert!(session.current_viewer().is_none());
    }

    #[test]
    fn test_token_without_profile_is_anonymous_viewer() {
        let store = Arc::new(InMemoryPreferenceStore::new());
        store.set(TOKEN_KEY, "tok").unwrap();
        store.set(USER_KEY, "{not json").unwrap();

        let viewer = StoredSession::new(store).current_viewer().unwrap();
        assert_eq!(viewer.display_name, ANONYMOUS_NAME);
        assert_eq!(viewer.access_token, "tok");
    }

    #[test]
    fn test_blank_token_is_signed_out() {
        let store = Arc::new(InMemoryPreferenceStore::new());
        store.set(TOKEN_KEY, "   ").unwrap();
        assert!(!StoredSession::new(store).is_authenticated());
    }
}
