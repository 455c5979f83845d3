//! Session state and the auth flows that drive it.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::{
    clients::BackendClient,
    error::{ApiError, ClientResult},
    models::{Credentials, NewUser, ProfileUpdate, User},
    storage::Storage,
    store::{read_lock, write_lock},
};

/// Storage namespace for the persisted session record.
pub const SESSION_NAMESPACE: &str = "session";

/// Persisted session record: identity plus bearer token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

type Listener = Box<dyn Fn(&SessionState) + Send + Sync>;
type InvalidationListener = Box<dyn Fn() + Send + Sync>;

struct SessionInner {
    state: RwLock<SessionState>,
    storage: Storage,
    listeners: RwLock<Vec<Listener>>,
    invalidation_listeners: RwLock<Vec<InvalidationListener>>,
}

/// Shared handle over the session: read by every outgoing backend
/// request, written by login/logout and by the 401 teardown path.
///
/// The in-memory record and the persisted one are updated under the
/// same lock, so they cannot disagree across a request cycle.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

impl SessionHandle {
    /// Creates a handle, restoring any persisted session record.
    pub fn new(storage: Storage) -> Self {
        let state = match storage.load::<SessionState>(SESSION_NAMESPACE) {
            Ok(Some(state)) => state,
            Ok(None) => SessionState::default(),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load persisted session, starting clean");
                SessionState::default()
            }
        };

        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(state),
                storage,
                listeners: RwLock::new(Vec::new()),
                invalidation_listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn token(&self) -> Option<String> {
        read_lock(&self.inner.state).token.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        read_lock(&self.inner.state).clone()
    }

    /// Replaces the session after a successful login or registration.
    pub fn establish(&self, user: User, token: String) {
        self.mutate(|state| {
            state.user = Some(user);
            state.token = Some(token);
        });
    }

    /// Replaces the stored identity (profile updates).
    pub fn set_user(&self, user: User) {
        self.mutate(|state| state.user = Some(user));
    }

    /// Clears the session without firing invalidation callbacks
    /// (explicit logout).
    pub fn clear(&self) {
        self.mutate(|state| *state = SessionState::default());
    }

    /// 401 teardown: clears identity and token, then tells every
    /// subscriber the session died out from under the user. Fired once
    /// per rejected response.
    pub fn invalidate(&self) {
        self.clear();
        for listener in read_lock(&self.inner.invalidation_listeners).iter() {
            listener();
        }
    }

    /// Registers a callback fired on every session mutation.
    pub fn subscribe(&self, listener: impl Fn(&SessionState) + Send + Sync + 'static) {
        write_lock(&self.inner.listeners).push(Box::new(listener));
    }

    /// Registers a callback fired when a 401 tears the session down.
    /// The host decides what an expired session looks like.
    pub fn on_invalidated(&self, listener: impl Fn() + Send + Sync + 'static) {
        write_lock(&self.inner.invalidation_listeners).push(Box::new(listener));
    }

    fn mutate(&self, apply: impl FnOnce(&mut SessionState)) {
        let snapshot = {
            let mut state = write_lock(&self.inner.state);
            apply(&mut state);
            if let Err(err) = self.inner.storage.save(SESSION_NAMESPACE, &*state) {
                tracing::error!(error = %err, "Failed to persist session state");
            }
            state.clone()
        };

        for listener in read_lock(&self.inner.listeners).iter() {
            listener(&snapshot);
        }
    }
}

/// Outcome of a login or registration attempt. Failure is data here,
/// not an error: callers must match on the rejected arm.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAttempt {
    Authenticated(User),
    Rejected { message: String },
}

impl AuthAttempt {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthAttempt::Authenticated(_))
    }
}

/// Session store: owns the shared handle and drives the auth flows.
pub struct SessionStore {
    handle: SessionHandle,
    client: BackendClient,
}

impl SessionStore {
    pub fn new(handle: SessionHandle, client: BackendClient) -> Self {
        Self { handle, client }
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn snapshot(&self) -> SessionState {
        self.handle.snapshot()
    }

    pub fn is_authenticated(&self) -> bool {
        self.handle.snapshot().is_authenticated()
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionState) + Send + Sync + 'static) {
        self.handle.subscribe(listener);
    }

    pub async fn login(&self, credentials: &Credentials) -> AuthAttempt {
        match self.client.login(credentials).await {
            Ok(auth) => {
                self.handle.establish(auth.user.clone(), auth.token);
                tracing::info!(user = %auth.user.username, "Logged in");
                AuthAttempt::Authenticated(auth.user)
            }
            Err(err) => AuthAttempt::Rejected {
                message: rejection_message(&err, "Login failed. Please try again."),
            },
        }
    }

    pub async fn register(&self, new_user: &NewUser) -> AuthAttempt {
        match self.client.register(new_user).await {
            Ok(auth) => {
                self.handle.establish(auth.user.clone(), auth.token);
                tracing::info!(user = %auth.user.username, "Registered");
                AuthAttempt::Authenticated(auth.user)
            }
            Err(err) => AuthAttempt::Rejected {
                message: rejection_message(&err, "Registration failed. Please try again."),
            },
        }
    }

    pub fn logout(&self) {
        self.handle.clear();
        tracing::info!("Logged out");
    }

    /// Replaces the stored identity without a network call.
    pub fn update_user(&self, user: User) {
        self.handle.set_user(user);
    }

    /// Pushes a profile update to the backend and mirrors the returned
    /// identity into the session.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<User> {
        let user = self.client.update_profile(update).await?;
        self.handle.set_user(user.clone());
        Ok(user)
    }

    /// Re-validates a persisted token against the backend on demand.
    /// Rejected tokens clear the session; transient failures keep it so
    /// a flaky network cannot log the user out.
    pub async fn restore_session(&self) -> ClientResult<Option<User>> {
        if self.handle.token().is_none() {
            return Ok(None);
        }

        match self.client.current_user().await {
            Ok(user) => {
                self.handle.set_user(user.clone());
                Ok(Some(user))
            }
            // The 401 path has already torn the session down.
            Err(ApiError::Unauthorized) => Ok(None),
            Err(err) if err.is_retryable() => Err(err),
            Err(err) => {
                tracing::warn!(error = %err, "Stored session token rejected, clearing session");
                self.handle.clear();
                Ok(None)
            }
        }
    }
}

fn rejection_message(err: &ApiError, fallback: &str) -> String {
    match err {
        ApiError::Client { message, .. } | ApiError::Server { message, .. }
            if !message.is_empty() =>
        {
            message.clone()
        }
        _ => fallback.to_string(),
    }
}
