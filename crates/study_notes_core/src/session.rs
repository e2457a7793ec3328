//! crates/study_notes_core/src/session.rs
//!
//! Pure state transitions on the `SessionState` aggregate.
//!
//! Nothing here performs I/O or reads the clock: callers pass in "now" and any
//! generated ids, which keeps every transition deterministic and testable.
//! Operations that target an unknown id leave the state untouched and report
//! `false`.

use crate::domain::{
    NoteRef, Playlist, PlaylistNote, RecentNote, SessionStage, SessionState, User, UserUpdate,
};

/// Maximum number of entries kept in the recently-viewed list.
pub const RECENT_NOTES_LIMIT: usize = 10;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

impl SessionState {
    /// The lifecycle stage derived from the sign-up and profile flags.
    pub fn stage(&self) -> SessionStage {
        if !self.is_signed_up {
            return SessionStage::SignedOut;
        }
        if !self.has_completed_info {
            return SessionStage::IncompleteProfile;
        }
        SessionStage::CompleteProfile {
            premium: self.user.as_ref().is_some_and(|u| u.is_premium),
        }
    }

    //-------------------------------------------------------------------------------------
    // Identity
    //-------------------------------------------------------------------------------------

    /// Records a successful sign-in.
    pub fn apply_sign_in(&mut self, user: User) {
        self.is_signed_up = true;
        self.has_completed_info = user.has_completed_info();
        self.has_shown_initial_popup = true;
        self.user = Some(user);
    }

    /// Re-hydrates the user fetched for an existing token.
    pub fn apply_restored_user(&mut self, user: User) {
        self.is_signed_up = true;
        self.has_completed_info = user.has_completed_info();
        self.user = Some(user);
    }

    /// Replaces the user with the server's copy after profile completion.
    pub fn apply_completed_profile(&mut self, user: User) {
        self.has_completed_info = true;
        self.user = Some(user);
    }

    pub fn apply_premium(&mut self) -> bool {
        match self.user.as_mut() {
            Some(user) => {
                user.is_premium = true;
                true
            }
            None => false,
        }
    }

    /// Merges `update` into the current user. No-op without a user.
    pub fn update_user(&mut self, update: UserUpdate) -> bool {
        match self.user.as_mut() {
            Some(user) => {
                update.apply_to(user);
                true
            }
            None => false,
        }
    }

    pub fn mark_initial_popup_shown(&mut self) -> bool {
        let changed = !self.has_shown_initial_popup;
        self.has_shown_initial_popup = true;
        changed
    }

    //-------------------------------------------------------------------------------------
    // Reading time
    //-------------------------------------------------------------------------------------

    /// Records `now` as the reading start unless one is already set.
    pub fn start_reading(&mut self, now: i64) -> bool {
        if self.reading_start_time.is_some() {
            return false;
        }
        self.reading_start_time = Some(now);
        true
    }

    /// Elapsed minutes since the reading start, or zero when unset.
    pub fn reading_minutes(&self, now: i64) -> f64 {
        match self.reading_start_time {
            Some(start) => now.saturating_sub(start).max(0) as f64 / MILLIS_PER_MINUTE,
            None => 0.0,
        }
    }

    //-------------------------------------------------------------------------------------
    // Recent notes
    //-------------------------------------------------------------------------------------

    /// Moves `note` to the front of the recent list, dropping any older entry with
    /// the same id and everything past the limit.
    pub fn push_recent_note(&mut self, note: NoteRef, last_page: u32, now: i64) {
        self.recent_notes.retain(|n| n.note_id != note.note_id);
        self.recent_notes.insert(0, RecentNote::new(note, last_page, now));
        self.recent_notes.truncate(RECENT_NOTES_LIMIT);
    }

    /// Updates the page of an existing entry in place. Never inserts.
    pub fn update_recent_note_progress(&mut self, note_id: &str, last_page: u32, now: i64) -> bool {
        match self.recent_notes.iter_mut().find(|n| n.note_id == note_id) {
            Some(entry) => {
                entry.last_page = last_page;
                entry.visited_at = now;
                true
            }
            None => false,
        }
    }

    //-------------------------------------------------------------------------------------
    // Playlists
    //-------------------------------------------------------------------------------------

    pub fn create_playlist(&mut self, id: String, name: String, now: i64) {
        self.my_words_playlists.push(Playlist {
            id,
            name,
            created_at: now,
            notes: Vec::new(),
        });
    }

    pub fn playlist(&self, playlist_id: &str) -> Option<&Playlist> {
        self.my_words_playlists.iter().find(|p| p.id == playlist_id)
    }

    fn playlist_mut(&mut self, playlist_id: &str) -> Option<&mut Playlist> {
        self.my_words_playlists.iter_mut().find(|p| p.id == playlist_id)
    }

    pub fn delete_playlist(&mut self, playlist_id: &str) -> bool {
        let before = self.my_words_playlists.len();
        self.my_words_playlists.retain(|p| p.id != playlist_id);
        self.my_words_playlists.len() != before
    }

    pub fn rename_playlist(&mut self, playlist_id: &str, name: String) -> bool {
        match self.playlist_mut(playlist_id) {
            Some(playlist) => {
                playlist.name = name;
                true
            }
            None => false,
        }
    }

    /// Appends `note` unless the playlist already holds that note id.
    pub fn add_note_to_playlist(&mut self, playlist_id: &str, note: NoteRef, now: i64) -> bool {
        let Some(playlist) = self.playlist_mut(playlist_id) else {
            return false;
        };
        if playlist.notes.iter().any(|n| n.note_id == note.note_id) {
            return false;
        }
        playlist.notes.push(PlaylistNote::new(note, now));
        true
    }

    /// Removes a note. The playlist itself stays, even when it becomes empty.
    pub fn remove_note_from_playlist(&mut self, playlist_id: &str, note_id: &str) -> bool {
        let Some(playlist) = self.playlist_mut(playlist_id) else {
            return false;
        };
        let before = playlist.notes.len();
        playlist.notes.retain(|n| n.note_id != note_id);
        playlist.notes.len() != before
    }
}
