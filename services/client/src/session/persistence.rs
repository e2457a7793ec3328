//! services/client/src/session/persistence.rs
//!
//! The persistence observer: a background task that mirrors every state
//! transition of an `AuthContext` into the Persisted State Store.
//!
//! Writes are asynchronous relative to the mutation that caused them. Several
//! quick transitions may be folded into one write, which is harmless because each
//! write stores the whole aggregate.

use std::time::Duration;
use study_notes_core::domain::SessionState;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::context::AuthContext;
use super::persisted::PersistedStateStore;

/// Owns the running observer task.
pub struct PersistenceHandle {
    cancellation_token: CancellationToken,
    task: JoinHandle<()>,
}

impl PersistenceHandle {
    /// Stops the observer after writing the latest snapshot if it was not saved yet.
    pub async fn shutdown(self) {
        self.cancellation_token.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Persistence task ended abnormally");
        }
    }
}

/// Registers a persistence observer on `context`.
///
/// `debounce` delays each write; zero writes as soon as a change is seen.
pub fn spawn_persistence(
    context: &AuthContext,
    store: PersistedStateStore,
    debounce: Duration,
) -> PersistenceHandle {
    let receiver = context.subscribe();
    let cancellation_token = CancellationToken::new();
    let task = tokio::spawn(persistence_process(
        receiver,
        store,
        debounce,
        cancellation_token.clone(),
    ));
    PersistenceHandle {
        cancellation_token,
        task,
    }
}

async fn persistence_process(
    mut receiver: watch::Receiver<SessionState>,
    store: PersistedStateStore,
    debounce: Duration,
    cancellation_token: CancellationToken,
) {
    info!("Persistence observer started.");
    let mut pending = false;

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => break,
            changed = receiver.changed() => {
                if changed.is_err() {
                    debug!("Session context dropped, stopping persistence observer.");
                    break;
                }
                pending = true;
                if !debounce.is_zero() {
                    tokio::select! {
                        _ = cancellation_token.cancelled() => break,
                        _ = tokio::time::sleep(debounce) => {}
                    }
                }
                let snapshot = receiver.borrow_and_update().clone();
                store.save(&snapshot);
                pending = false;
            }
        }
    }

    // Flush whatever arrived but was not written yet.
    if pending || receiver.has_changed().unwrap_or(false) {
        let snapshot = receiver.borrow_and_update().clone();
        store.save(&snapshot);
        debug!("Flushed final session snapshot.");
    }
    info!("Persistence observer stopped.");
}
