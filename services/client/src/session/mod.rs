pub mod context;
pub mod persisted;
pub mod persistence;
pub mod token;

pub use context::{AuthContext, SessionEvent};
pub use persisted::{PersistedStateStore, AUTH_STORAGE_KEY};
pub use persistence::{spawn_persistence, PersistenceHandle};
pub use token::{TokenStore, TOKEN_KEY};
