//! services/client/src/lib.rs
//!
//! Client-side session layer for the notes platform: the remote API adapter,
//! local storage, and the auth/profile state container built on top of them.

pub mod adapters;
pub mod config;
pub mod error;
pub mod session;

use std::sync::Arc;

use adapters::{HttpApi, SystemClock};
use config::Config;
use error::ClientError;
use session::{AuthContext, PersistedStateStore, TokenStore};
use study_notes_core::ports::{Notifier, StorageBackend};

/// Everything a front end needs, wired over one storage backend.
pub struct ClientServices {
    pub context: Arc<AuthContext>,
    pub api: Arc<HttpApi>,
    pub store: PersistedStateStore,
}

impl ClientServices {
    /// Builds the HTTP adapter and the auth context from `config`.
    pub fn build(
        config: &Config,
        storage: Arc<dyn StorageBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let tokens = TokenStore::new(storage.clone());
        let store = PersistedStateStore::new(storage);
        let http = reqwest::Client::builder().build()?;
        let api = Arc::new(HttpApi::new(http, config.api_base_url.clone(), tokens.clone()));
        let context = Arc::new(AuthContext::new(
            api.clone(),
            store.clone(),
            tokens,
            notifier,
            Arc::new(SystemClock),
        ));
        Ok(Self {
            context,
            api,
            store,
        })
    }
}
