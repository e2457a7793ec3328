//! crates/study_notes_core/src/domain.rs
//!
//! Defines the core data structures of the notes client: the signed-in user,
//! the reading history, the "My Words" playlists and the session aggregate that
//! is persisted as a single JSON blob.
//!
//! The JSON shape is the one the browser client has always written, so field
//! names are camelCase and missing or `null` fields fall back to their defaults.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decodes `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

//=========================================================================================
// User
//=========================================================================================

/// The two course families offered on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CourseType {
    Engineering,
    Diploma,
}

impl CourseType {
    /// Highest semester number a student of this course type can be in.
    pub fn max_semester(self) -> u32 {
        match self {
            CourseType::Engineering => 8,
            CourseType::Diploma => 6,
        }
    }

    /// Checks a semester label such as `"5th Semester"` against this course type
    /// and returns the semester number it carries.
    pub fn validate_semester(self, label: &str) -> Result<u32, SemesterError> {
        let number = parse_semester_number(label).ok_or(SemesterError::Missing)?;
        if number == 0 || number > self.max_semester() {
            return Err(SemesterError::OutOfRange {
                course_type: self,
                max: self.max_semester(),
            });
        }
        Ok(number)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CourseType::Engineering => "ENGINEERING",
            CourseType::Diploma => "DIPLOMA",
        }
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENGINEERING" => Ok(CourseType::Engineering),
            "DIPLOMA" => Ok(CourseType::Diploma),
            other => Err(format!("unknown course type '{}'", other)),
        }
    }
}

/// Why a semester label was refused for a course type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemesterError {
    #[error("Semester must contain a number")]
    Missing,
    #[error("{course_type} only has {max} semesters.")]
    OutOfRange { course_type: CourseType, max: u32 },
}

/// Extracts the digits of a semester label, e.g. `"3rd Semester"` -> `3`.
pub fn parse_semester_number(label: &str) -> Option<u32> {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// The signed-in user as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub college: String,
    #[serde(deserialize_with = "null_as_default")]
    pub semester: String,
    pub course_type: Option<CourseType>,
    // The server spells this `premium`; the persisted blob uses `isPremium`.
    #[serde(alias = "premium", deserialize_with = "null_as_default")]
    pub is_premium: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
}

impl User {
    /// A profile is complete once both the institution and the semester are known.
    pub fn has_completed_info(&self) -> bool {
        !self.college.is_empty() && !self.semester.is_empty()
    }
}

/// A partial set of user fields, merged locally by `update_user`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub college: Option<String>,
    pub semester: Option<String>,
    pub course_type: Option<CourseType>,
    pub is_premium: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        *self == UserUpdate::default()
    }

    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(college) = self.college {
            user.college = college;
        }
        if let Some(semester) = self.semester {
            user.semester = semester;
        }
        if let Some(course_type) = self.course_type {
            user.course_type = Some(course_type);
        }
        if let Some(is_premium) = self.is_premium {
            user.is_premium = is_premium;
        }
    }
}

//=========================================================================================
// Notes, Reading History and Playlists
//=========================================================================================

/// A denormalized reference to a note, as the browsing screens know it.
///
/// The labels are plain strings, not foreign keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteRef {
    pub note_id: String,
    pub subject: String,
    pub domain: String,
    pub course_type: String,
    pub title: String,
}

/// One entry of the "recently viewed" list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecentNote {
    pub note_id: String,
    pub subject: String,
    pub domain: String,
    pub course_type: String,
    pub title: String,
    pub last_page: u32,
    /// Epoch milliseconds.
    pub visited_at: i64,
}

impl RecentNote {
    pub fn new(note: NoteRef, last_page: u32, visited_at: i64) -> Self {
        Self {
            note_id: note.note_id,
            subject: note.subject,
            domain: note.domain,
            course_type: note.course_type,
            title: note.title,
            last_page,
            visited_at,
        }
    }
}

/// A note stored inside a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistNote {
    pub note_id: String,
    pub subject: String,
    pub domain: String,
    pub course_type: String,
    pub title: String,
    /// Epoch milliseconds.
    pub added_at: i64,
}

impl PlaylistNote {
    pub fn new(note: NoteRef, added_at: i64) -> Self {
        Self {
            note_id: note.note_id,
            subject: note.subject,
            domain: note.domain,
            course_type: note.course_type,
            title: note.title,
            added_at,
        }
    }
}

/// A user-defined "My Words" playlist. Lives only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: Vec<PlaylistNote>,
}

//=========================================================================================
// Session Aggregate
//=========================================================================================

/// Everything the client remembers about the current browser profile.
///
/// This is the unit of persistence: it is always written and read as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    #[serde(deserialize_with = "null_as_default")]
    pub is_signed_up: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_completed_info: bool,
    pub user: Option<User>,
    /// Epoch milliseconds of the first `start_reading` call.
    pub reading_start_time: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub has_shown_initial_popup: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub recent_notes: Vec<RecentNote>,
    #[serde(deserialize_with = "null_as_default")]
    pub my_words_playlists: Vec<Playlist>,
}

/// Where the session sits in the sign-up lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    SignedOut,
    IncompleteProfile,
    CompleteProfile { premium: bool },
}

//=========================================================================================
// Catalog (browsing funnel)
//=========================================================================================

/// A top-level study domain, e.g. "computer" or "it".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Domain {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub icon_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub color_class: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bg_class: String,
    #[serde(deserialize_with = "null_as_default")]
    pub course_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subject {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(alias = "premium", deserialize_with = "null_as_default")]
    pub is_premium: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(alias = "premium", deserialize_with = "null_as_default")]
    pub is_premium: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub pages: u32,
}

//=========================================================================================
// Remote API Payloads
//=========================================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteProfileRequest {
    pub college: String,
    pub semester: String,
    pub course_type: CourseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The event kinds the analytics endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalyticsAction {
    Login,
    Signup,
    ViewPdf,
    DownloadPdf,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub action: AnalyticsAction,
    pub note_id: Option<String>,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_user_with_nulls_decodes() {
        let json = r#"{
            "id": "65f0",
            "name": "Jane",
            "email": "jane@example.com",
            "password": "$2a$10$hash",
            "college": null,
            "semester": null,
            "courseType": null,
            "premium": true,
            "role": "ROLE_USER"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.college, "");
        assert_eq!(user.course_type, None);
        assert!(user.is_premium);
        assert!(!user.has_completed_info());
    }

    #[test]
    fn persisted_user_keeps_is_premium_key() {
        let user = User {
            is_premium: true,
            course_type: Some(CourseType::Diploma),
            ..User::default()
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["isPremium"], true);
        assert_eq!(value["courseType"], "DIPLOMA");
    }

    #[test]
    fn partial_state_merges_over_defaults() {
        let json = r#"{"isSignedUp": true, "recentNotes": null, "somethingElse": 4}"#;
        let state: SessionState = serde_json::from_str(json).unwrap();
        assert!(state.is_signed_up);
        assert!(state.recent_notes.is_empty());
        assert!(state.my_words_playlists.is_empty());
        assert_eq!(state.user, None);
    }

    #[test]
    fn semester_validation_follows_course_type() {
        assert_eq!(CourseType::Engineering.validate_semester("8th Semester"), Ok(8));
        assert_eq!(
            CourseType::Diploma.validate_semester("7th Semester"),
            Err(SemesterError::OutOfRange {
                course_type: CourseType::Diploma,
                max: 6
            })
        );
        assert_eq!(
            CourseType::Engineering.validate_semester("final"),
            Err(SemesterError::Missing)
        );
        assert!(CourseType::Diploma.validate_semester("0").is_err());
    }

    #[test]
    fn course_type_parses_case_insensitively() {
        assert_eq!("engineering".parse::<CourseType>(), Ok(CourseType::Engineering));
        assert!("medicine".parse::<CourseType>().is_err());
    }

    #[test]
    fn analytics_action_uses_server_names() {
        let event = AnalyticsEvent {
            action: AnalyticsAction::ViewPdf,
            note_id: Some("n1".into()),
            details: None,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["action"], "VIEW_PDF");
        assert_eq!(value["noteId"], "n1");
    }
}
