//! Client-side data layer for the Cinetrack movie application.
//!
//! Everything between the UI and the network lives here: a
//! session-aware client for the application's own REST backend, a
//! retrying client for the third-party movie catalog, a generic
//! bounded-retry wrapper, and the persisted session / watchlist /
//! theme stores.

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod retry;
pub mod storage;
pub mod store;

pub use clients::{BackendClient, CatalogClient, CatalogSource};
pub use config::Config;
pub use error::{ApiError, ClientResult};
pub use notify::{LogNotifier, Notifier, NoticeLevel};
pub use retry::{CallState, RetryPolicy, TrackedCall};
pub use storage::Storage;
pub use store::{
    AuthAttempt, ClientState, SessionHandle, SessionState, SessionStore, Theme, ThemeStore,
    WatchlistStore,
};

/// Initializes tracing with the conventional env-filter setup. Safe to
/// call more than once; later calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
