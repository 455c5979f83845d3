//! Persisted client state stores.
//!
//! Explicit state objects owned by the application shell: each store
//! persists to its own namespace on every mutation and exposes
//! read/write/subscribe operations. Nothing here is a global.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    clients::BackendClient,
    config::Config,
    error::ClientResult,
    models::{Credentials, NewUser, User},
    storage::Storage,
};

pub mod session;
pub mod theme;
pub mod watchlist;

pub use session::{AuthAttempt, SessionHandle, SessionState, SessionStore};
pub use theme::{Theme, ThemeStore};
pub use watchlist::WatchlistStore;

/// Mutations survive a panicked writer; the data is plain state with no
/// broken-invariant window.
pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// The full set of client stores, wired the way an application shell
/// consumes them.
pub struct ClientState {
    client: BackendClient,
    pub session: SessionStore,
    pub watchlist: WatchlistStore,
    pub theme: ThemeStore,
    sync_watchlist_on_login: bool,
}

impl ClientState {
    /// Builds the store set over the backend client's session handle
    /// and a shared storage root.
    pub fn new(config: &Config, client: BackendClient) -> Self {
        let storage = Storage::new(config.storage_dir());

        Self {
            session: SessionStore::new(client.session().clone(), client.clone()),
            watchlist: WatchlistStore::new(storage.clone()),
            theme: ThemeStore::new(storage),
            sync_watchlist_on_login: config.sync_watchlist_on_login,
            client,
        }
    }

    /// Login plus the flag-gated watchlist fetch.
    pub async fn login(&self, credentials: &Credentials) -> AuthAttempt {
        let attempt = self.session.login(credentials).await;
        if attempt.is_authenticated() {
            self.sync_watchlist().await;
        }
        attempt
    }

    /// Registration plus the flag-gated watchlist fetch.
    pub async fn register(&self, new_user: &NewUser) -> AuthAttempt {
        let attempt = self.session.register(new_user).await;
        if attempt.is_authenticated() {
            self.sync_watchlist().await;
        }
        attempt
    }

    /// Restores a persisted session and, when it validates, runs the
    /// flag-gated watchlist fetch.
    pub async fn restore_session(&self) -> ClientResult<Option<User>> {
        let restored = self.session.restore_session().await?;
        if restored.is_some() {
            self.sync_watchlist().await;
        }
        Ok(restored)
    }

    /// Fetch-on-login reconciliation. Failures are logged, not
    /// surfaced: the local cache keeps serving.
    async fn sync_watchlist(&self) {
        if !self.sync_watchlist_on_login {
            return;
        }

        if let Err(err) = self.watchlist.reconcile(&self.client).await {
            tracing::warn!(error = %err, "Watchlist reconciliation failed");
        }
    }
}
