//! services/client/src/session/token.rs
//!
//! The bearer-token slot. It lives under its own storage key, separate from the
//! session aggregate, and is read by the HTTP adapter on every request.

use std::sync::Arc;
use study_notes_core::ports::{PortResult, StorageBackend};
use tracing::warn;

pub const TOKEN_KEY: &str = "token";

#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn StorageBackend>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// The stored token, if any. Unreadable storage counts as "no token".
    pub fn get(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read bearer token");
                None
            }
        }
    }

    pub fn set(&self, token: &str) -> PortResult<()> {
        self.storage.set_item(TOKEN_KEY, token)
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(TOKEN_KEY) {
            warn!(error = %e, "Failed to clear bearer token");
        }
    }
}
