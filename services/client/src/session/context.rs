//! services/client/src/session/context.rs
//!
//! The Auth/Profile Context: the single owner of the in-memory `SessionState`.
//!
//! The state lives in a `watch` channel, so every transition is visible to any
//! number of subscribers (the persistence observer is one of them). Lifecycle
//! milestones are additionally broadcast as `SessionEvent`s; `LoggedOut` is the
//! reset signal front ends use to drop whatever they derived from the old user.
//!
//! Network-backed operations never return an error. Failures become a notice
//! through the `Notifier` port and a `false` result with the state unchanged.

use parking_lot::Mutex;
use std::sync::Arc;
use study_notes_core::domain::{
    AnalyticsAction, AnalyticsEvent, CompleteProfileRequest, CourseType, NoteRef, SessionStage,
    SessionState, SignInRequest, SignUpRequest, UserUpdate,
};
use study_notes_core::ports::{Clock, Notice, Notifier, PortError, PortResult, SessionApi};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::persisted::PersistedStateStore;
use super::token::TokenStore;

const EVENT_CAPACITY: usize = 16;

/// Lifecycle milestones broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: String },
    ProfileCompleted,
    PremiumActivated,
    /// Everything was reset to the signed-out defaults.
    LoggedOut,
}

//=========================================================================================
// The Context
//=========================================================================================

pub struct AuthContext {
    state: watch::Sender<SessionState>,
    events: broadcast::Sender<SessionEvent>,
    /// Bumped on every logout; responses that started in an older epoch are dropped.
    /// Held while a response is applied and while a logout runs, so the two never
    /// interleave.
    epoch: Mutex<u64>,
    api: Arc<dyn SessionApi>,
    store: PersistedStateStore,
    tokens: TokenStore,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl AuthContext {
    /// Creates a context seeded from whatever `store` currently holds.
    pub fn new(
        api: Arc<dyn SessionApi>,
        store: PersistedStateStore,
        tokens: TokenStore,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(store.load());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state,
            events,
            epoch: Mutex::new(0),
            api,
            store,
            tokens,
            notifier,
            clock,
        }
    }

    //-------------------------------------------------------------------------------------
    // Observation
    //-------------------------------------------------------------------------------------

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn stage(&self) -> SessionStage {
        self.state.borrow().stage()
    }

    /// A receiver that wakes on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    //-------------------------------------------------------------------------------------
    // Helpers
    //-------------------------------------------------------------------------------------

    fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    fn current_epoch(&self) -> u64 {
        *self.epoch.lock()
    }

    /// Runs `apply` unless a logout happened since `epoch` was read.
    ///
    /// The epoch lock is held for the duration of `apply`; a concurrent `logout`
    /// either lands before (and the response is dropped) or after (and resets it).
    fn apply_if_current<R>(
        &self,
        epoch: u64,
        operation: &str,
        apply: impl FnOnce() -> R,
    ) -> Option<R> {
        let current = self.epoch.lock();
        if *current != epoch {
            debug!(operation, "Discarding response that arrived after logout");
            return None;
        }
        Some(apply())
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn report(&self, operation: &str, error: PortError, fallback: &str) {
        warn!(operation, error = %error, "Session operation failed");
        let message = match error {
            PortError::Rejected(message) => message,
            PortError::Network(_) => "Could not reach the server. Please try again.".to_string(),
            _ => fallback.to_string(),
        };
        self.notifier.notify(Notice::error(message));
    }

    //-------------------------------------------------------------------------------------
    // Account
    //-------------------------------------------------------------------------------------

    /// Registers an account. The caller still has to sign in afterwards.
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> bool {
        let request = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        match self.api.sign_up(&request).await {
            Ok(()) => {
                info!(email, "Account registered");
                self.notifier
                    .notify(Notice::success("Account created. Please sign in to continue."));
                true
            }
            Err(e) => {
                self.report("sign_up", e, "Sign up failed. Please try again.");
                false
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> bool {
        let epoch = self.current_epoch();
        let request = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = match self.api.sign_in(&request).await {
            Ok(response) => response,
            Err(e) => {
                self.report("sign_in", e, "Invalid email or password.");
                return false;
            }
        };
        let user_id = response.user.id.clone();
        let greeting = format!("Welcome back, {}!", response.user.name);
        let applied = self.apply_if_current(epoch, "sign_in", || -> PortResult<()> {
            self.tokens.set(&response.token)?;
            self.state.send_modify(|s| s.apply_sign_in(response.user));
            Ok(())
        });
        match applied {
            None => return false,
            Some(Err(e)) => {
                self.report("sign_in", e, "Could not store your session on this device.");
                return false;
            }
            Some(Ok(())) => {}
        }
        info!(user_id = %user_id, "Signed in");
        self.emit(SessionEvent::SignedIn { user_id });
        self.notifier.notify(Notice::success(greeting));
        true
    }

    /// Re-hydrates the user for a stored token, as done on page load.
    ///
    /// Returns whether a user is held afterwards.
    pub async fn restore_session(&self) -> bool {
        if self.state.borrow().user.is_some() {
            return true;
        }
        if self.tokens.get().is_none() {
            return false;
        }

        let epoch = self.current_epoch();
        match self.api.fetch_profile().await {
            Ok(user) => {
                let user_id = user.id.clone();
                let applied = self.apply_if_current(epoch, "restore_session", || {
                    self.state.send_modify(|s| s.apply_restored_user(user));
                });
                if applied.is_some() {
                    info!(user_id = %user_id, "Session restored from stored token");
                }
                applied.is_some()
            }
            Err(PortError::Unauthorized) => {
                warn!("Stored token was rejected, dropping it");
                self.apply_if_current(epoch, "restore_session", || self.tokens.clear());
                false
            }
            Err(e) => {
                warn!(error = %e, "Could not restore session");
                false
            }
        }
    }

    /// Sends the onboarding profile fields to the server and adopts its user record.
    pub async fn complete_user_info(
        &self,
        college: &str,
        semester: &str,
        course_type: CourseType,
        name: Option<&str>,
    ) -> bool {
        if let Err(e) = course_type.validate_semester(semester) {
            self.notifier.notify(Notice::error(e.to_string()));
            return false;
        }

        let epoch = self.current_epoch();
        let request = CompleteProfileRequest {
            college: college.to_string(),
            semester: semester.to_string(),
            course_type,
            name: name.map(str::to_string),
        };
        match self.api.complete_profile(&request).await {
            Ok(user) => {
                let applied = self.apply_if_current(epoch, "complete_user_info", || {
                    self.state.send_modify(|s| s.apply_completed_profile(user));
                });
                if applied.is_none() {
                    return false;
                }
                info!("Profile completed");
                self.emit(SessionEvent::ProfileCompleted);
                self.notifier.notify(Notice::success("Profile updated."));
                true
            }
            Err(e) => {
                self.report("complete_user_info", e, "Failed to update profile.");
                false
            }
        }
    }

    /// Merges fields into the local user record only. Nothing is sent to the server.
    pub fn update_user(&self, update: UserUpdate) -> bool {
        if update.is_empty() {
            return false;
        }
        self.state.send_if_modified(|s| s.update_user(update))
    }

    pub async fn upgrade_to_premium(&self) -> bool {
        let epoch = self.current_epoch();
        match self.api.upgrade_to_premium().await {
            Ok(()) => {
                let applied = self.apply_if_current(epoch, "upgrade_to_premium", || {
                    self.state.send_if_modified(|s| s.apply_premium());
                });
                if applied.is_none() {
                    return false;
                }
                info!("Upgraded to premium");
                self.emit(SessionEvent::PremiumActivated);
                self.notifier.notify(Notice::success("Welcome to Premium!"));
                true
            }
            Err(e) => {
                self.report("upgrade_to_premium", e, "Upgrade failed. Please try again.");
                false
            }
        }
    }

    /// Drops the token and the stored aggregate and resets every subscriber to the
    /// signed-out defaults.
    pub fn logout(&self) {
        {
            let mut epoch = self.epoch.lock();
            *epoch += 1;
            self.tokens.clear();
            self.store.clear();
            self.state.send_replace(SessionState::default());
        }
        info!("Logged out");
        self.emit(SessionEvent::LoggedOut);
    }

    //-------------------------------------------------------------------------------------
    // Reading session
    //-------------------------------------------------------------------------------------

    /// Records "now" as the reading start. Later calls keep the first timestamp.
    pub fn start_reading(&self) {
        let now = self.now();
        self.state.send_if_modified(|s| s.start_reading(now));
    }

    /// Minutes elapsed since `start_reading`, or zero if it was never called.
    pub fn reading_duration(&self) -> f64 {
        self.state.borrow().reading_minutes(self.now())
    }

    pub fn mark_initial_popup_shown(&self) {
        self.state.send_if_modified(SessionState::mark_initial_popup_shown);
    }

    //-------------------------------------------------------------------------------------
    // Recent notes
    //-------------------------------------------------------------------------------------

    /// Puts `note` at the front of the recently-viewed list and reports the view.
    pub fn add_recent_note(&self, note: NoteRef, last_page: u32) {
        self.track_in_background(AnalyticsEvent {
            action: AnalyticsAction::ViewPdf,
            note_id: Some(note.note_id.clone()),
            details: Some(note.title.clone()),
        });
        let now = self.now();
        self.state.send_modify(|s| s.push_recent_note(note, last_page, now));
    }

    pub fn update_recent_note_progress(&self, note_id: &str, last_page: u32) -> bool {
        let now = self.now();
        let updated = self
            .state
            .send_if_modified(|s| s.update_recent_note_progress(note_id, last_page, now));
        if !updated {
            debug!(note_id, "No recent entry to update");
        }
        updated
    }

    /// Fires an analytics event without waiting for it. Failures are only logged.
    fn track_in_background(&self, event: AnalyticsEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(action = ?event.action, "No async runtime, analytics skipped");
            return;
        };
        let api = Arc::clone(&self.api);
        handle.spawn(async move {
            if let Err(e) = api.track(&event).await {
                debug!(error = %e, action = ?event.action, "Analytics call failed");
            }
        });
    }

    //-------------------------------------------------------------------------------------
    // Playlists
    //-------------------------------------------------------------------------------------

    /// Creates an empty playlist and returns its id.
    pub fn create_playlist(&self, name: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let now = self.now();
        let name = name.to_string();
        let new_id = id.clone();
        self.state.send_modify(|s| s.create_playlist(new_id, name, now));
        id
    }

    pub fn delete_playlist(&self, playlist_id: &str) -> bool {
        self.playlist_change(playlist_id, |s| s.delete_playlist(playlist_id))
    }

    pub fn rename_playlist(&self, playlist_id: &str, name: &str) -> bool {
        self.playlist_change(playlist_id, |s| s.rename_playlist(playlist_id, name.to_string()))
    }

    /// Adds `note` to the playlist. Adding a note that is already there changes nothing.
    pub fn add_note_to_playlist(&self, playlist_id: &str, note: NoteRef) -> bool {
        let now = self.now();
        self.playlist_change(playlist_id, |s| s.add_note_to_playlist(playlist_id, note, now))
    }

    pub fn remove_note_from_playlist(&self, playlist_id: &str, note_id: &str) -> bool {
        self.playlist_change(playlist_id, |s| s.remove_note_from_playlist(playlist_id, note_id))
    }

    fn playlist_change<F>(&self, playlist_id: &str, change: F) -> bool
    where
        F: FnOnce(&mut SessionState) -> bool,
    {
        let changed = self.state.send_if_modified(change);
        if !changed {
            debug!(playlist_id, "Playlist change had no effect");
        }
        changed
    }
}
