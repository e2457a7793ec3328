pub mod domain;
pub mod ports;
pub mod session;

pub use domain::{
    AnalyticsAction, AnalyticsEvent, CompleteProfileRequest, CourseType, Domain, Note, NoteRef,
    Playlist, PlaylistNote, RecentNote, SemesterError, SessionStage, SessionState, SignInRequest,
    SignInResponse, SignUpRequest, Subject, User, UserUpdate,
};
pub use ports::{
    CatalogApi, Clock, Notice, NoticeLevel, Notifier, PortError, PortResult, SessionApi,
    StorageBackend,
};
pub use session::RECENT_NOTES_LIMIT;
