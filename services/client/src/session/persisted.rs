//! services/client/src/session/persisted.rs
//!
//! The Persisted State Store: a passive mirror of the `SessionState` aggregate
//! under a single storage key.
//!
//! Reading never fails: an absent or unreadable blob yields the default
//! aggregate. Writing never fails either: problems are logged and dropped.

use std::sync::Arc;
use study_notes_core::domain::SessionState;
use study_notes_core::ports::StorageBackend;
use tracing::{debug, warn};

pub const AUTH_STORAGE_KEY: &str = "adroits_auth_state";

#[derive(Clone)]
pub struct PersistedStateStore {
    storage: Arc<dyn StorageBackend>,
}

impl PersistedStateStore {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Reads the aggregate, merging whatever was stored over the defaults.
    pub fn load(&self) -> SessionState {
        let raw = match self.storage.get_item(AUTH_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SessionState::default(),
            Err(e) => {
                warn!(error = %e, "Error reading auth state");
                return SessionState::default();
            }
        };

        match serde_json::from_str::<SessionState>(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Stored auth state is malformed, starting from defaults");
                SessionState::default()
            }
        }
    }

    /// Overwrites the stored aggregate with `state`.
    pub fn save(&self, state: &SessionState) {
        let raw = match serde_json::to_string(state) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to encode auth state");
                return;
            }
        };
        match self.storage.set_item(AUTH_STORAGE_KEY, &raw) {
            Ok(()) => debug!(bytes = raw.len(), "Auth state persisted"),
            Err(e) => warn!(error = %e, "Failed to persist auth state"),
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(AUTH_STORAGE_KEY) {
            warn!(error = %e, "Failed to clear auth state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FileStorage, MemoryStorage};
    use study_notes_core::domain::{CourseType, NoteRef, User};
    use study_notes_core::domain::{Playlist, PlaylistNote, RecentNote};
    use study_notes_core::ports::{PortError, PortResult};
    use proptest::prelude::*;

    fn populated_state() -> SessionState {
        let mut state = SessionState::default();
        state.apply_sign_in(User {
            id: "u1".into(),
            name: "Jane".into(),
            email: "jane@example.com".into(),
            college: "MIT".into(),
            semester: "3rd Semester".into(),
            course_type: Some(CourseType::Engineering),
            is_premium: true,
            role: "ROLE_USER".into(),
        });
        state.start_reading(1_000);
        state.push_recent_note(
            NoteRef {
                note_id: "n1".into(),
                subject: "DBMS".into(),
                domain: "computer".into(),
                course_type: "engineering".into(),
                title: "Normal forms".into(),
            },
            4,
            2_000,
        );
        state.create_playlist("p1".into(), "Exam".into(), 3_000);
        state
    }

    #[test]
    fn fresh_storage_loads_defaults() {
        let store = PersistedStateStore::new(Arc::new(MemoryStorage::new()));
        let state = store.load();
        assert_eq!(state, SessionState::default());
        assert!(!state.is_signed_up);
        assert!(state.user.is_none());
    }

    #[test]
    fn save_then_load_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
        let state = populated_state();

        PersistedStateStore::new(storage.clone()).save(&state);
        // A second store over the same directory stands in for a page reload.
        let reloaded = PersistedStateStore::new(storage).load();
        assert_eq!(reloaded, state);
    }

    fn text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 _-]{0,12}"
    }

    prop_compose! {
        fn arb_user()(
            id in text(),
            name in text(),
            email in text(),
            college in text(),
            semester in text(),
            course_type in prop::option::of(prop_oneof![
                Just(CourseType::Engineering),
                Just(CourseType::Diploma)
            ]),
            is_premium in any::<bool>(),
            role in text()
        ) -> User {
            User { id, name, email, college, semester, course_type, is_premium, role }
        }
    }

    prop_compose! {
        fn arb_recent_note()(
            note_id in text(),
            title in text(),
            subject in text(),
            last_page in any::<u32>(),
            visited_at in any::<i64>()
        ) -> RecentNote {
            RecentNote {
                note_id,
                title,
                subject,
                last_page,
                visited_at,
                ..RecentNote::default()
            }
        }
    }

    prop_compose! {
        fn arb_playlist()(
            id in text(),
            name in text(),
            created_at in any::<i64>(),
            notes in prop::collection::vec(
                (text(), text(), any::<i64>()).prop_map(|(note_id, domain, added_at)| PlaylistNote {
                    note_id,
                    domain,
                    added_at,
                    ..PlaylistNote::default()
                }),
                0..4,
            )
        ) -> Playlist {
            Playlist { id, name, created_at, notes }
        }
    }

    prop_compose! {
        fn arb_session_state()(
            is_signed_up in any::<bool>(),
            has_completed_info in any::<bool>(),
            user in prop::option::of(arb_user()),
            reading_start_time in prop::option::of(any::<i64>()),
            has_shown_initial_popup in any::<bool>(),
            recent_notes in prop::collection::vec(arb_recent_note(), 0..5),
            my_words_playlists in prop::collection::vec(arb_playlist(), 0..4)
        ) -> SessionState {
            SessionState {
                is_signed_up,
                has_completed_info,
                user,
                reading_start_time,
                has_shown_initial_popup,
                recent_notes,
                my_words_playlists,
            }
        }
    }

    proptest! {
        #[test]
        fn any_state_survives_save_and_load(state in arb_session_state()) {
            let store = PersistedStateStore::new(Arc::new(MemoryStorage::new()));
            store.save(&state);
            prop_assert_eq!(store.load(), state);
        }
    }

    #[test]
    fn malformed_blob_loads_defaults() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(AUTH_STORAGE_KEY, "{not json").unwrap();
        assert_eq!(PersistedStateStore::new(storage.clone()).load(), SessionState::default());

        storage.set_item(AUTH_STORAGE_KEY, "[1, 2, 3]").unwrap();
        assert_eq!(PersistedStateStore::new(storage).load(), SessionState::default());
    }

    #[test]
    fn missing_arrays_default_to_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(
                AUTH_STORAGE_KEY,
                r#"{"isSignedUp":true,"hasCompletedInfo":false,"user":{"id":"u1","name":"A"},"myWordsPlaylists":null}"#,
            )
            .unwrap();
        let state = PersistedStateStore::new(storage).load();
        assert!(state.is_signed_up);
        assert_eq!(state.user.unwrap().name, "A");
        assert!(state.recent_notes.is_empty());
        assert!(state.my_words_playlists.is_empty());
    }

    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn get_item(&self, _key: &str) -> PortResult<Option<String>> {
            Err(PortError::Storage("disk on fire".into()))
        }
        fn set_item(&self, _key: &str, _value: &str) -> PortResult<()> {
            Err(PortError::Storage("quota exceeded".into()))
        }
        fn remove_item(&self, _key: &str) -> PortResult<()> {
            Err(PortError::Storage("read-only".into()))
        }
    }

    #[test]
    fn storage_failures_never_surface() {
        let store = PersistedStateStore::new(Arc::new(BrokenStorage));
        store.save(&populated_state());
        store.clear();
        assert_eq!(store.load(), SessionState::default());
    }

    #[test]
    fn clear_removes_the_blob() {
        let storage = Arc::new(MemoryStorage::new());
        let store = PersistedStateStore::new(storage.clone());
        store.save(&populated_state());
        store.clear();
        assert_eq!(storage.get_item(AUTH_STORAGE_KEY).unwrap(), None);
        assert_eq!(store.load(), SessionState::default());
    }
}
