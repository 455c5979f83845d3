//! Client-side watchlist cache.

use std::sync::RwLock;

use crate::{
    clients::BackendClient,
    error::ClientResult,
    models::{MovieSummary, WatchlistEntry},
    storage::Storage,
    store::{read_lock, write_lock},
};

/// Storage namespace for the persisted watchlist.
pub const WATCHLIST_NAMESPACE: &str = "watchlist";

type Listener = Box<dyn Fn(&[WatchlistEntry]) + Send + Sync>;

/// Ordered watchlist persisted locally on every mutation.
///
/// Adds and removes never touch the server, so the local list can
/// diverge from the server-side watchlist until [`reconcile`] replaces
/// it with the server's copy.
///
/// [`reconcile`]: WatchlistStore::reconcile
pub struct WatchlistStore {
    entries: RwLock<Vec<WatchlistEntry>>,
    storage: Storage,
    listeners: RwLock<Vec<Listener>>,
}

impl WatchlistStore {
    /// Creates the store, restoring any persisted list.
    pub fn new(storage: Storage) -> Self {
        let entries = match storage.load::<Vec<WatchlistEntry>>(WATCHLIST_NAMESPACE) {
            Ok(Some(entries)) => entries,
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load persisted watchlist, starting empty");
                Vec::new()
            }
        };

        Self {
            entries: RwLock::new(entries),
            storage,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<WatchlistEntry> {
        read_lock(&self.entries).clone()
    }

    pub fn contains(&self, tmdb_id: u64) -> bool {
        read_lock(&self.entries).iter().any(|e| e.tmdb_id == tmdb_id)
    }

    pub fn len(&self) -> usize {
        read_lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        read_lock(&self.entries).is_empty()
    }

    /// Appends the movie. Duplicates are allowed here; uniqueness is
    /// the backend's invariant, not ours.
    pub fn add(&self, movie: &MovieSummary) {
        self.mutate(|entries| entries.push(WatchlistEntry::from(movie)));
    }

    /// Removes every entry with the given identifier.
    pub fn remove(&self, tmdb_id: u64) {
        self.mutate(|entries| entries.retain(|e| e.tmdb_id != tmdb_id));
    }

    /// Registers a callback fired on every mutation.
    pub fn subscribe(&self, listener: impl Fn(&[WatchlistEntry]) + Send + Sync + 'static) {
        write_lock(&self.listeners).push(Box::new(listener));
    }

    /// Replaces local contents with the server's watchlist. Returns the
    /// number of entries fetched.
    pub async fn reconcile(&self, client: &BackendClient) -> ClientResult<usize> {
        let rows = client.watchlist().await?;
        let count = rows.len();

        self.mutate(|entries| {
            *entries = rows.into_iter().map(WatchlistEntry::from).collect();
        });

        tracing::info!(entries = count, "Watchlist reconciled from server");
        Ok(count)
    }

    fn mutate(&self, apply: impl FnOnce(&mut Vec<WatchlistEntry>)) {
        let snapshot = {
            let mut entries = write_lock(&self.entries);
            apply(&mut entries);
            if let Err(err) = self.storage.save(WATCHLIST_NAMESPACE, &*entries) {
                tracing::error!(error = %err, "Failed to persist watchlist");
            }
            entries.clone()
        };

        for listener in read_lock(&self.listeners).iter() {
            listener(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn movie(id: u64, title: &str) -> MovieSummary {
        serde_json::from_value(json!({ "id": id, "title": title })).unwrap()
    }

    #[test]
    fn test_add_then_remove_restores_original_contents() {
        let dir = tempdir().unwrap();
        let store = WatchlistStore::new(Storage::new(dir.path()));
        store.add(&movie(1, "Heat"));
        let before = store.entries();

        store.add(&movie(2, "Ronin"));
        assert!(store.contains(2));

        store.remove(2);
        assert_eq!(store.entries(), before);
    }

    #[test]
    fn test_remove_by_identifier_only_touches_matches() {
        let dir = tempdir().unwrap();
        let store = WatchlistStore::new(Storage::new(dir.path()));
        store.add(&movie(1, "Heat"));
        store.add(&movie(2, "Ronin"));

        store.remove(1);

        assert!(!store.contains(1));
        assert!(store.contains(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_mutations_persist_across_instances() {
        let dir = tempdir().unwrap();

        {
            let store = WatchlistStore::new(Storage::new(dir.path()));
            store.add(&movie(27205, "Inception"));
        }

        let reloaded = WatchlistStore::new(Storage::new(dir.path()));
        assert!(reloaded.contains(27205));
        assert_eq!(reloaded.entries()[0].title, "Inception");
    }

    #[test]
    fn test_duplicates_are_not_rejected_locally() {
        let dir = tempdir().unwrap();
        let store = WatchlistStore::new(Storage::new(dir.path()));
        store.add(&movie(1, "Heat"));
        store.add(&movie(1, "Heat"));

        assert_eq!(store.len(), 2);

        store.remove(1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_subscribe_receives_snapshot() {
        let dir = tempdir().unwrap();
        let store = WatchlistStore::new(Storage::new(dir.path()));

        let seen = std::sync::Arc::new(RwLock::new(0usize));
        let sink = seen.clone();
        store.subscribe(move |entries| {
            *sink.write().unwrap() = entries.len();
        });

        store.add(&movie(1, "Heat"));
        assert_eq!(*seen.read().unwrap(), 1);
    }
}
